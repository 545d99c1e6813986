//! Persisted forms of an encrypted record.
//!
//! Provides version-aware binary framing, its base64 armor, and the JSON
//! document form.

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::error::{Error, Result};
use crate::record::EncryptedRecord;

pub mod json;
pub mod v1;

/// Magic bytes identifying a sealed record ("SSTR").
pub const MAGIC: &[u8; 4] = b"SSTR";
/// Length of magic bytes.
pub const MAGIC_LEN: usize = 4;
/// Length of version field.
pub const VER_LEN: usize = 1;
/// Latest format version
pub const CURRENT_VERSION: u8 = v1::VERSION_V1;

/// Text encodings a record can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Standard base64 of the binary form.
    #[default]
    Base64,
    Json,
}

/// Parses a binary record, dispatching on its version byte.
///
/// # Errors
///
/// Returns [`Error::MalformedRecord`] if:
/// - The input is too short
/// - The magic bytes are invalid
/// - The version is unsupported
pub fn parse(data: &[u8]) -> Result<EncryptedRecord> {
    if data.len() < MAGIC_LEN + VER_LEN {
        return Err(Error::MalformedRecord("record too short".into()));
    }

    if &data[..MAGIC_LEN] != MAGIC {
        return Err(Error::MalformedRecord("invalid magic".into()));
    }

    match data[MAGIC_LEN] {
        v1::VERSION_V1 => v1::parse(data),
        other => Err(Error::MalformedRecord(format!(
            "unsupported record version: {other}"
        ))),
    }
}

/// Serializes a record in the current binary format.
pub fn serialize(record: &EncryptedRecord) -> Result<Vec<u8>> {
    v1::serialize(record)
}

/// Base64 armor of the binary form.
pub fn to_base64(record: &EncryptedRecord) -> Result<String> {
    Ok(STANDARD.encode(serialize(record)?))
}

pub fn from_base64(text: &str) -> Result<EncryptedRecord> {
    let data = STANDARD
        .decode(text.trim())
        .map_err(|e| Error::MalformedRecord(format!("invalid base64: {e}")))?;
    parse(&data)
}

pub fn encode_text(record: &EncryptedRecord, encoding: Encoding) -> Result<String> {
    match encoding {
        Encoding::Base64 => to_base64(record),
        Encoding::Json => json::to_json(record),
    }
}

/// Decodes either text form; input starting with `{` is taken as JSON.
pub fn decode_text(text: &str) -> Result<EncryptedRecord> {
    if text.trim_start().starts_with('{') {
        json::from_json(text)
    } else {
        from_base64(text)
    }
}
