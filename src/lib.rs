//! Password-based authenticated encryption of strings.
//!
//! [`EncryptedRecord::encrypt`] derives a key from a password and a fresh
//! salt, seals the text under a fresh nonce, and returns a record carrying
//! everything but the password. [`EncryptedRecord::decrypt`] reverses it or
//! fails closed.
//!
//! ```no_run
//! let record = sealstr::encrypt("hello world", "correct horse battery staple")?;
//! let text = sealstr::format::to_base64(&record)?;
//!
//! let restored = sealstr::format::from_base64(&text)?;
//! assert_eq!(
//!     sealstr::decrypt(&restored, "correct horse battery staple")?.as_str(),
//!     "hello world"
//! );
//! # Ok::<(), sealstr::Error>(())
//! ```

pub mod crypto;
mod error;
pub mod format;
mod record;
mod storage;

pub use crate::crypto::{
    AeadAlgorithm, DerivedKey, KdfAlgorithm, ParameterSet, derive_key, generate_password, open,
    random_bytes, seal,
};
pub use crate::error::{Error, Result};
pub use crate::format::Encoding;
pub use crate::record::EncryptedRecord;
pub use crate::storage::Storage;

use zeroize::Zeroizing;

/// Encrypt with the default parameter set.
pub fn encrypt(plaintext: &str, password: &str) -> Result<EncryptedRecord> {
    EncryptedRecord::encrypt(plaintext, password, &ParameterSet::default())
}

/// Decrypt using the parameters stored in the record.
pub fn decrypt(record: &EncryptedRecord, password: &str) -> Result<Zeroizing<String>> {
    record.decrypt(password)
}
