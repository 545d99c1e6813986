use base64::{Engine, engine::general_purpose::STANDARD};
use getrandom::fill;
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Fill buffer with cryptographically secure random bytes.
///
/// Blocks until the OS generator is seeded.
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    fill(buf).map_err(|_| Error::EntropyUnavailable)
}

/// Returns `n` fresh random bytes.
pub fn random_bytes(n: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; n];
    fill_random(&mut buf)?;
    Ok(buf)
}

/// Generate a password from `len_bytes` random bytes, base64 encoded.
///
/// # Errors
///
/// Returns [`Error::Configuration`] for a zero length.
pub fn generate_password(len_bytes: usize) -> Result<Zeroizing<String>> {
    if len_bytes == 0 {
        return Err(Error::Configuration(
            "password length must be at least 1 byte".into(),
        ));
    }

    let raw = Zeroizing::new(random_bytes(len_bytes)?);
    Ok(Zeroizing::new(STANDARD.encode(&*raw)))
}
