//! JSON document form of a record, for text-oriented storage.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use super::CURRENT_VERSION;
use crate::crypto::ParameterSet;
use crate::error::{Error, Result};
use crate::record::EncryptedRecord;

/// Serialized layout: parameters in clear, byte fields base64 encoded.
#[derive(Debug, Serialize, Deserialize)]
struct RecordDocument {
    version: u8,
    params: ParameterSet,
    salt: String,
    nonce: String,
    ciphertext: String,
}

pub fn to_json(record: &EncryptedRecord) -> Result<String> {
    let doc = RecordDocument {
        version: CURRENT_VERSION,
        params: *record.params(),
        salt: STANDARD.encode(record.salt()),
        nonce: STANDARD.encode(record.nonce()),
        ciphertext: STANDARD.encode(record.ciphertext()),
    };

    serde_json::to_string_pretty(&doc)
        .map_err(|e| Error::MalformedRecord(format!("failed to serialize record: {e}")))
}

pub fn from_json(text: &str) -> Result<EncryptedRecord> {
    let doc: RecordDocument = serde_json::from_str(text)
        .map_err(|e| Error::MalformedRecord(format!("invalid record document: {e}")))?;

    if doc.version != CURRENT_VERSION {
        return Err(Error::MalformedRecord(format!(
            "unsupported record version: {}",
            doc.version
        )));
    }

    Ok(EncryptedRecord::from_parts(
        doc.params,
        decode_field("salt", &doc.salt)?,
        decode_field("nonce", &doc.nonce)?,
        decode_field("ciphertext", &doc.ciphertext)?,
    ))
}

fn decode_field(name: &str, value: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| Error::MalformedRecord(format!("invalid {name} encoding: {e}")))
}
