//! Self-describing encrypted values.

use tracing::debug;
use zeroize::Zeroizing;

use crate::crypto::{self, ParameterSet};
use crate::error::{Error, Result};

/// Ciphertext together with everything except the password needed to
/// decrypt it.
///
/// Only produced by [`EncryptedRecord::encrypt`] or by decoding a previously
/// produced record; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedRecord {
    params: ParameterSet,
    salt: Vec<u8>,
    nonce: Vec<u8>,
    ciphertext: Vec<u8>,
}

impl EncryptedRecord {
    /// Seal `plaintext` under a key derived from `password`.
    ///
    /// A fresh salt and nonce are drawn for every call, so the same inputs
    /// never produce the same record twice.
    ///
    /// # Errors
    ///
    /// - [`Error::Configuration`] if `params` is invalid
    /// - [`Error::EntropyUnavailable`] if the OS generator fails
    /// - [`Error::KeyDerivation`] if the KDF rejects its inputs
    pub fn encrypt(plaintext: &str, password: &str, params: &ParameterSet) -> Result<Self> {
        params.validate()?;

        let salt = crypto::random_bytes(params.salt_len())?;
        let nonce = crypto::random_bytes(params.nonce_len())?;

        let ciphertext = {
            let key = crypto::derive_key(password, &salt, params)?;
            crypto::seal(
                params,
                &key,
                &nonce,
                plaintext.as_bytes(),
                &params.to_bytes(),
            )?
        };

        debug!(
            kdf = %params.kdf(),
            aead = %params.aead(),
            iterations = params.iterations(),
            ciphertext_len = ciphertext.len(),
            "sealed record"
        );

        Ok(Self {
            params: *params,
            salt,
            nonce,
            ciphertext,
        })
    }

    /// Recover the plaintext using the record's own salt, nonce and
    /// parameters.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedRecord`] if lengths or stored parameters are
    ///   inconsistent, or the authentic plaintext is not UTF-8
    /// - [`Error::AuthenticationFailed`] for a wrong password or any tampering
    pub fn decrypt(&self, password: &str) -> Result<Zeroizing<String>> {
        self.check_shape()?;

        let plaintext = {
            let key = crypto::derive_key(password, &self.salt, &self.params)?;
            crypto::open(
                &self.params,
                &key,
                &self.nonce,
                &self.ciphertext,
                &self.params.to_bytes(),
            )
        };

        let plaintext = match plaintext {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(error = %e, "record failed to open");
                return Err(e);
            }
        };

        String::from_utf8(plaintext).map(Zeroizing::new).map_err(|e| {
            let mut bytes = e.into_bytes();
            zeroize::Zeroize::zeroize(&mut bytes);
            Error::MalformedRecord("decrypted data is not valid UTF-8".into())
        })
    }

    /// Rebuild a record from decoded fields. Lengths are checked on decrypt.
    pub(crate) fn from_parts(
        params: ParameterSet,
        salt: Vec<u8>,
        nonce: Vec<u8>,
        ciphertext: Vec<u8>,
    ) -> Self {
        Self {
            params,
            salt,
            nonce,
            ciphertext,
        }
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    /// Ciphertext with the authentication tag appended.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    fn check_shape(&self) -> Result<()> {
        self.params
            .validate()
            .map_err(|e| Error::MalformedRecord(e.to_string()))?;

        if self.salt.len() != self.params.salt_len() {
            return Err(Error::MalformedRecord(format!(
                "salt is {} bytes, parameters say {}",
                self.salt.len(),
                self.params.salt_len()
            )));
        }
        if self.nonce.len() != self.params.nonce_len() {
            return Err(Error::MalformedRecord(format!(
                "nonce is {} bytes, parameters say {}",
                self.nonce.len(),
                self.params.nonce_len()
            )));
        }
        if self.ciphertext.len() < self.params.tag_len() {
            return Err(Error::MalformedRecord(
                "ciphertext shorter than authentication tag".into(),
            ));
        }

        Ok(())
    }
}
