use aes_gcm::{
    AesGcm,
    aead::{
        Aead, AeadCore, KeyInit, Nonce, Payload,
        consts::{U12, U13, U14, U15, U16},
        generic_array::typenum::Unsigned,
    },
    aes::{Aes128, Aes192, Aes256},
};
use chacha20poly1305::XChaCha20Poly1305;
use tracing::trace;

use super::params::{AeadAlgorithm, ParameterSet};
use crate::error::{Error, Result};

/// Expands to a call of `$op::<Cipher>($args)` for the cipher type matching
/// the parameter set's AEAD, key size and tag size.
macro_rules! dispatch {
    ($params:expr, $op:ident($($arg:expr),*)) => {
        match ($params.aead(), $params.key_bits(), $params.tag_bits()) {
            (AeadAlgorithm::AesGcm, 128, 96) => $op::<AesGcm<Aes128, U12, U12>>($($arg),*),
            (AeadAlgorithm::AesGcm, 128, 104) => $op::<AesGcm<Aes128, U12, U13>>($($arg),*),
            (AeadAlgorithm::AesGcm, 128, 112) => $op::<AesGcm<Aes128, U12, U14>>($($arg),*),
            (AeadAlgorithm::AesGcm, 128, 120) => $op::<AesGcm<Aes128, U12, U15>>($($arg),*),
            (AeadAlgorithm::AesGcm, 128, 128) => $op::<AesGcm<Aes128, U12, U16>>($($arg),*),
            (AeadAlgorithm::AesGcm, 192, 96) => $op::<AesGcm<Aes192, U12, U12>>($($arg),*),
            (AeadAlgorithm::AesGcm, 192, 104) => $op::<AesGcm<Aes192, U12, U13>>($($arg),*),
            (AeadAlgorithm::AesGcm, 192, 112) => $op::<AesGcm<Aes192, U12, U14>>($($arg),*),
            (AeadAlgorithm::AesGcm, 192, 120) => $op::<AesGcm<Aes192, U12, U15>>($($arg),*),
            (AeadAlgorithm::AesGcm, 192, 128) => $op::<AesGcm<Aes192, U12, U16>>($($arg),*),
            (AeadAlgorithm::AesGcm, 256, 96) => $op::<AesGcm<Aes256, U12, U12>>($($arg),*),
            (AeadAlgorithm::AesGcm, 256, 104) => $op::<AesGcm<Aes256, U12, U13>>($($arg),*),
            (AeadAlgorithm::AesGcm, 256, 112) => $op::<AesGcm<Aes256, U12, U14>>($($arg),*),
            (AeadAlgorithm::AesGcm, 256, 120) => $op::<AesGcm<Aes256, U12, U15>>($($arg),*),
            (AeadAlgorithm::AesGcm, 256, 128) => $op::<AesGcm<Aes256, U12, U16>>($($arg),*),
            (AeadAlgorithm::XChaCha20Poly1305, 256, 128) => {
                $op::<XChaCha20Poly1305>($($arg),*)
            }
            (aead, key_bits, tag_bits) => Err(Error::Configuration(format!(
                "{aead} does not support {key_bits}-bit keys with {tag_bits}-bit tags"
            ))),
        }
    };
}

/// Encrypt `plaintext`, returning the ciphertext with the tag appended.
///
/// `aad` is authenticated but not encrypted. The caller must never reuse a
/// (key, nonce) pair for a second message.
///
/// # Errors
///
/// Returns [`Error::Configuration`] if the parameter set is invalid or the
/// key/nonce lengths disagree with it.
pub fn seal(
    params: &ParameterSet,
    key: &[u8],
    nonce: &[u8],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    params.validate()?;
    trace!(aead = %params.aead(), len = plaintext.len(), "sealing");
    dispatch!(params, seal_with(key, nonce, plaintext, aad))
}

/// Verify and decrypt `ciphertext` (tag appended).
///
/// Nothing is returned unless the tag verifies over the ciphertext, nonce
/// and `aad`.
///
/// # Errors
///
/// Returns [`Error::AuthenticationFailed`] on any tag mismatch, including a
/// ciphertext shorter than the tag.
pub fn open(
    params: &ParameterSet,
    key: &[u8],
    nonce: &[u8],
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    params.validate()?;
    trace!(aead = %params.aead(), len = ciphertext.len(), "opening");
    dispatch!(params, open_with(key, nonce, ciphertext, aad))
}

fn cipher<C: KeyInit + AeadCore>(key: &[u8], nonce: &[u8]) -> Result<(C, Nonce<C>)> {
    let cipher = C::new_from_slice(key)
        .map_err(|_| Error::Configuration(format!("invalid key length {}", key.len())))?;

    if nonce.len() != C::NonceSize::USIZE {
        return Err(Error::Configuration(format!(
            "nonce must be {} bytes, got {}",
            C::NonceSize::USIZE,
            nonce.len()
        )));
    }

    Ok((cipher, Nonce::<C>::clone_from_slice(nonce)))
}

fn seal_with<C: KeyInit + Aead>(
    key: &[u8],
    nonce: &[u8],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    let (cipher, nonce) = cipher::<C>(key, nonce)?;

    cipher
        .encrypt(&nonce, Payload { msg: plaintext, aad })
        .map_err(|_| Error::Configuration("plaintext too large for a single AEAD call".into()))
}

fn open_with<C: KeyInit + Aead>(
    key: &[u8],
    nonce: &[u8],
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    let (cipher, nonce) = cipher::<C>(key, nonce)?;

    cipher
        .decrypt(&nonce, Payload { msg: ciphertext, aad })
        .map_err(|_| Error::AuthenticationFailed)
}
