use argon2::{Algorithm, Argon2, Params, Version};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use tracing::trace;
use zeroize::Zeroizing;

use super::params::{KdfAlgorithm, ParameterSet};
use crate::error::{Error, Result};

/// Key material wiped from memory when dropped.
pub type DerivedKey = Zeroizing<Vec<u8>>;

/// Derive `params.key_len()` bytes of key material from a password and salt.
///
/// Deterministic in all three inputs. Runtime depends only on the parameter
/// set, never on the password bytes.
///
/// # Errors
///
/// Returns [`Error::Configuration`] for an invalid parameter set and
/// [`Error::KeyDerivation`] if the primitive rejects its inputs.
pub fn derive_key(password: &str, salt: &[u8], params: &ParameterSet) -> Result<DerivedKey> {
    params.validate()?;

    let mut key = Zeroizing::new(vec![0u8; params.key_len()]);

    trace!(
        kdf = %params.kdf(),
        iterations = params.iterations(),
        salt_len = salt.len(),
        key_len = key.len(),
        "deriving key"
    );

    match params.kdf() {
        KdfAlgorithm::Pbkdf2HmacSha256 => {
            pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, params.iterations(), &mut key);
        }
        KdfAlgorithm::Argon2id => {
            let argon_params = Params::new(
                params.memory_kib(),
                params.iterations(),
                params.parallelism(),
                Some(key.len()),
            )
            .map_err(|e| Error::KeyDerivation(format!("failed to construct Argon2 params: {e}")))?;

            Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params)
                .hash_password_into(password.as_bytes(), salt, &mut key)
                .map_err(|e| Error::KeyDerivation(format!("argon2 key derivation failed: {e}")))?;
        }
    }

    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> ParameterSet {
        ParameterSet::default().with_iterations(1_000)
    }

    #[test]
    fn kdf_is_deterministic() {
        let salt = [42u8; 32];

        let k1 = derive_key("password", &salt, &fast()).unwrap();
        let k2 = derive_key("password", &salt, &fast()).unwrap();

        assert_eq!(k1, k2);
        assert_eq!(k1.len(), 32);
    }

    #[test]
    fn pbkdf2_matches_rfc7914_vector() {
        // RFC 7914 section 11, PBKDF2-HMAC-SHA256 with c = 1.
        let params = ParameterSet::default()
            .with_iterations(1)
            .with_key_bits(256);
        let key = derive_key("passwd", b"salt", &params).unwrap();

        assert_eq!(
            key[..],
            [
                0x55, 0xac, 0x04, 0x6e, 0x56, 0xe3, 0x08, 0x9f, 0xec, 0x16, 0x91, 0xc2, 0x25,
                0x44, 0xb6, 0x05, 0xf9, 0x41, 0x85, 0x21, 0x6d, 0xde, 0x04, 0x65, 0xe6, 0x8b,
                0x9d, 0x57, 0xc2, 0x0d, 0xac, 0xbc,
            ]
        );
    }

    #[test]
    fn single_byte_changes_avalanche() {
        let salt = [7u8; 32];
        let base = derive_key("password", &salt, &fast()).unwrap();

        let other_pw = derive_key("passwore", &salt, &fast()).unwrap();
        let mut salt2 = salt;
        salt2[31] ^= 1;
        let other_salt = derive_key("password", &salt2, &fast()).unwrap();

        for other in [&other_pw, &other_salt] {
            assert_ne!(base, *other);
            let differing: u32 = base
                .iter()
                .zip(other.iter())
                .map(|(a, b)| (a ^ b).count_ones())
                .sum();
            // 256 output bits, expect roughly half to flip
            assert!(differing > 64, "only {differing} bits changed");
        }
    }

    #[test]
    fn params_affect_output() {
        let salt = [7u8; 16];

        let k1 = derive_key("pw", &salt, &fast()).unwrap();
        let k2 = derive_key("pw", &salt, &fast().with_iterations(1_001)).unwrap();

        assert_ne!(k1, k2);
    }

    #[test]
    fn key_length_follows_params() {
        let salt = [1u8; 16];
        let key = derive_key("pw", &salt, &fast().with_key_bits(128)).unwrap();
        assert_eq!(key.len(), 16);
    }

    #[test]
    fn argon2id_is_deterministic() {
        let params = ParameterSet::argon2id().with_memory_kib(64).with_iterations(1);
        let salt = [9u8; 16];

        let k1 = derive_key("pw", &salt, &params).unwrap();
        let k2 = derive_key("pw", &salt, &params).unwrap();
        let pb = derive_key("pw", &salt, &fast()).unwrap();

        assert_eq!(k1, k2);
        assert_ne!(k1, pb);
    }

    #[test]
    fn invalid_params_fail_gracefully() {
        let result = derive_key("pw", &[0u8; 16], &ParameterSet::default().with_iterations(0));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
