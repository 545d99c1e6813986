//! Record format v1.
//!
//! ```text
//! MAGIC (4) | VERSION (1) | PARAMS (21) | SALT (salt_len) | NONCE (nonce_len) | CIPHERTEXT
//! ```
//!
//! Salt and nonce lengths come from the parameter block; the ciphertext
//! (tag included) runs to the end of the input.

use super::{MAGIC, MAGIC_LEN, VER_LEN};
use crate::crypto::ParameterSet;
use crate::error::{Error, Result};
use crate::record::EncryptedRecord;

pub const VERSION_V1: u8 = 1;

const HEADER_LEN: usize = MAGIC_LEN + VER_LEN + ParameterSet::LEN;

/// Parses a v1 record.
///
/// # Errors
///
/// Returns [`Error::MalformedRecord`] if the input is too short for the
/// lengths its own parameter block declares.
pub fn parse(data: &[u8]) -> Result<EncryptedRecord> {
    if data.len() < HEADER_LEN {
        return Err(Error::MalformedRecord("record too short for v1".into()));
    }

    let mut offset = MAGIC_LEN + VER_LEN;

    let params = ParameterSet::from_bytes(&data[offset..offset + ParameterSet::LEN])?;
    offset += ParameterSet::LEN;

    let salt_len = params.salt_len();
    let nonce_len = params.nonce_len();

    if data.len() < offset + salt_len + nonce_len {
        return Err(Error::MalformedRecord(
            "record too short for declared salt and nonce".into(),
        ));
    }

    let salt = data[offset..offset + salt_len].to_vec();
    offset += salt_len;

    let nonce = data[offset..offset + nonce_len].to_vec();
    offset += nonce_len;

    let ciphertext = data[offset..].to_vec();

    Ok(EncryptedRecord::from_parts(params, salt, nonce, ciphertext))
}

/// Serializes a record to v1 bytes.
///
/// # Errors
///
/// Returns [`Error::MalformedRecord`] if salt or nonce disagree with the
/// record's parameters, since such a record could not be framed.
pub fn serialize(record: &EncryptedRecord) -> Result<Vec<u8>> {
    let params = record.params();

    if record.salt().len() != params.salt_len() {
        return Err(Error::MalformedRecord("invalid salt length for v1".into()));
    }

    if record.nonce().len() != params.nonce_len() {
        return Err(Error::MalformedRecord("invalid nonce length for v1".into()));
    }

    let mut buf = Vec::with_capacity(
        HEADER_LEN + record.salt().len() + record.nonce().len() + record.ciphertext().len(),
    );

    buf.extend_from_slice(MAGIC);
    buf.push(VERSION_V1);
    buf.extend_from_slice(&params.to_bytes());
    buf.extend_from_slice(record.salt());
    buf.extend_from_slice(record.nonce());
    buf.extend_from_slice(record.ciphertext());

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EncryptedRecord {
        EncryptedRecord::from_parts(
            ParameterSet::default().with_salt_len(16),
            vec![1u8; 16],
            vec![2u8; 12],
            vec![3u8; 20],
        )
    }

    #[test]
    fn layout_roundtrip() {
        let record = sample();

        let bytes = serialize(&record).unwrap();
        assert_eq!(bytes.len(), HEADER_LEN + 16 + 12 + 20);
        assert_eq!(&bytes[..4], b"SSTR");
        assert_eq!(bytes[4], VERSION_V1);

        let parsed = parse(&bytes).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn empty_ciphertext_still_frames() {
        let record = EncryptedRecord::from_parts(
            ParameterSet::default().with_salt_len(16),
            vec![1u8; 16],
            vec![2u8; 12],
            Vec::new(),
        );
        let parsed = parse(&serialize(&record).unwrap()).unwrap();
        assert!(parsed.ciphertext().is_empty());
    }

    #[test]
    fn truncated_salt_fails() {
        let bytes = serialize(&sample()).unwrap();
        assert!(matches!(
            parse(&bytes[..HEADER_LEN + 10]),
            Err(Error::MalformedRecord(_))
        ));
    }

    #[test]
    fn header_too_short_fails() {
        let bytes = serialize(&sample()).unwrap();
        assert!(parse(&bytes[..HEADER_LEN - 1]).is_err());
    }

    #[test]
    fn mismatched_salt_cannot_serialize() {
        let record = EncryptedRecord::from_parts(
            ParameterSet::default(),
            vec![1u8; 16],
            vec![2u8; 12],
            vec![3u8; 20],
        );
        assert!(serialize(&record).is_err());
    }
}
