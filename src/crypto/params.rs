//! Algorithm choices and sizes shared by the encrypting and decrypting side.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 65_536;
/// Default Argon2id time cost used by [`ParameterSet::argon2id`].
pub const DEFAULT_ARGON2_TIME_COST: u32 = 3;
/// Default Argon2id memory cost (64 MiB).
pub const DEFAULT_MEMORY_KIB: u32 = 64 * 1024;
pub const DEFAULT_PARALLELISM: u32 = 1;
pub const DEFAULT_SALT_LEN: u16 = 32;
pub const DEFAULT_KEY_BITS: u16 = 256;
pub const DEFAULT_NONCE_LEN: u8 = 12;
pub const DEFAULT_TAG_BITS: u16 = 128;

pub const MAX_ITERATIONS: u32 = 10_000_000;
pub const MAX_SALT_LEN: u16 = 1024;
pub const MAX_MEMORY_KIB: u32 = 4 * 1024 * 1024;
pub const MAX_PARALLELISM: u32 = 255;
const ARGON2_MIN_SALT_LEN: u16 = 8;

const KDF_ID_LEN: usize = 1;
const ITER_LEN: usize = 4;
const MEM_LEN: usize = 4;
const PAR_LEN: usize = 4;
const SALT_LEN_LEN: usize = 2;
const KEY_BITS_LEN: usize = 2;
const AEAD_ID_LEN: usize = 1;
const NONCE_LEN_LEN: usize = 1;
const TAG_BITS_LEN: usize = 2;

/// Password-based key derivation function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KdfAlgorithm {
    #[serde(rename = "pbkdf2-hmac-sha256")]
    Pbkdf2HmacSha256,
    #[serde(rename = "argon2id")]
    Argon2id,
}

impl KdfAlgorithm {
    pub fn id(self) -> u8 {
        match self {
            KdfAlgorithm::Pbkdf2HmacSha256 => 1,
            KdfAlgorithm::Argon2id => 2,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(KdfAlgorithm::Pbkdf2HmacSha256),
            2 => Some(KdfAlgorithm::Argon2id),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            KdfAlgorithm::Pbkdf2HmacSha256 => "pbkdf2-hmac-sha256",
            KdfAlgorithm::Argon2id => "argon2id",
        }
    }
}

impl fmt::Display for KdfAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KdfAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pbkdf2-hmac-sha256" | "pbkdf2" => Ok(KdfAlgorithm::Pbkdf2HmacSha256),
            "argon2id" | "argon2" => Ok(KdfAlgorithm::Argon2id),
            other => Err(Error::Configuration(format!("unknown KDF algorithm '{other}'"))),
        }
    }
}

/// Authenticated encryption construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AeadAlgorithm {
    #[serde(rename = "aes-gcm")]
    AesGcm,
    #[serde(rename = "xchacha20-poly1305")]
    XChaCha20Poly1305,
}

impl AeadAlgorithm {
    pub fn id(self) -> u8 {
        match self {
            AeadAlgorithm::AesGcm => 1,
            AeadAlgorithm::XChaCha20Poly1305 => 2,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(AeadAlgorithm::AesGcm),
            2 => Some(AeadAlgorithm::XChaCha20Poly1305),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AeadAlgorithm::AesGcm => "aes-gcm",
            AeadAlgorithm::XChaCha20Poly1305 => "xchacha20-poly1305",
        }
    }

    /// Key sizes in bits the construction accepts.
    pub fn key_bits(self) -> &'static [u16] {
        match self {
            AeadAlgorithm::AesGcm => &[128, 192, 256],
            AeadAlgorithm::XChaCha20Poly1305 => &[256],
        }
    }

    /// Native nonce length in bytes.
    pub fn nonce_len(self) -> u8 {
        match self {
            AeadAlgorithm::AesGcm => 12,
            AeadAlgorithm::XChaCha20Poly1305 => 24,
        }
    }

    /// Tag sizes in bits the construction accepts (NIST SP 800-38D for GCM).
    pub fn tag_bits(self) -> &'static [u16] {
        match self {
            AeadAlgorithm::AesGcm => &[96, 104, 112, 120, 128],
            AeadAlgorithm::XChaCha20Poly1305 => &[128],
        }
    }
}

impl fmt::Display for AeadAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AeadAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "aes-gcm" | "aes256-gcm" => Ok(AeadAlgorithm::AesGcm),
            "xchacha20-poly1305" | "xchacha" => Ok(AeadAlgorithm::XChaCha20Poly1305),
            other => Err(Error::Configuration(format!("unknown AEAD algorithm '{other}'"))),
        }
    }
}

/// Immutable bundle of algorithm choices and sizes.
///
/// `with_*` methods return a modified copy; nothing is validated until the
/// set is used by [`derive_key`](crate::crypto::derive_key),
/// [`seal`](crate::crypto::seal) or a record operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSet {
    kdf: KdfAlgorithm,
    iterations: u32,
    memory_kib: u32,
    parallelism: u32,
    salt_len: u16,
    key_bits: u16,
    aead: AeadAlgorithm,
    nonce_len: u8,
    tag_bits: u16,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            kdf: KdfAlgorithm::Pbkdf2HmacSha256,
            iterations: DEFAULT_ITERATIONS,
            memory_kib: DEFAULT_MEMORY_KIB,
            parallelism: DEFAULT_PARALLELISM,
            salt_len: DEFAULT_SALT_LEN,
            key_bits: DEFAULT_KEY_BITS,
            aead: AeadAlgorithm::AesGcm,
            nonce_len: DEFAULT_NONCE_LEN,
            tag_bits: DEFAULT_TAG_BITS,
        }
    }
}

impl ParameterSet {
    /// Length of the canonical byte encoding.
    pub const LEN: usize = KDF_ID_LEN
        + ITER_LEN
        + MEM_LEN
        + PAR_LEN
        + SALT_LEN_LEN
        + KEY_BITS_LEN
        + AEAD_ID_LEN
        + NONCE_LEN_LEN
        + TAG_BITS_LEN;

    /// Defaults with Argon2id in place of PBKDF2.
    pub fn argon2id() -> Self {
        Self::default()
            .with_kdf(KdfAlgorithm::Argon2id)
            .with_iterations(DEFAULT_ARGON2_TIME_COST)
    }

    pub fn with_kdf(self, kdf: KdfAlgorithm) -> Self {
        Self { kdf, ..self }
    }

    /// PBKDF2 rounds, or Argon2id time cost.
    pub fn with_iterations(self, iterations: u32) -> Self {
        Self { iterations, ..self }
    }

    pub fn with_memory_kib(self, memory_kib: u32) -> Self {
        Self { memory_kib, ..self }
    }

    pub fn with_parallelism(self, parallelism: u32) -> Self {
        Self {
            parallelism,
            ..self
        }
    }

    pub fn with_salt_len(self, salt_len: u16) -> Self {
        Self { salt_len, ..self }
    }

    pub fn with_key_bits(self, key_bits: u16) -> Self {
        Self { key_bits, ..self }
    }

    /// Switches the AEAD construction and resets the nonce length to its
    /// native size.
    pub fn with_aead(self, aead: AeadAlgorithm) -> Self {
        Self {
            aead,
            nonce_len: aead.nonce_len(),
            ..self
        }
    }

    pub fn with_nonce_len(self, nonce_len: u8) -> Self {
        Self { nonce_len, ..self }
    }

    pub fn with_tag_bits(self, tag_bits: u16) -> Self {
        Self { tag_bits, ..self }
    }

    pub fn kdf(&self) -> KdfAlgorithm {
        self.kdf
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn memory_kib(&self) -> u32 {
        self.memory_kib
    }

    pub fn parallelism(&self) -> u32 {
        self.parallelism
    }

    pub fn salt_len(&self) -> usize {
        usize::from(self.salt_len)
    }

    pub fn key_bits(&self) -> u16 {
        self.key_bits
    }

    /// Derived key length in bytes.
    pub fn key_len(&self) -> usize {
        usize::from(self.key_bits / 8)
    }

    pub fn aead(&self) -> AeadAlgorithm {
        self.aead
    }

    pub fn nonce_len(&self) -> usize {
        usize::from(self.nonce_len)
    }

    pub fn tag_bits(&self) -> u16 {
        self.tag_bits
    }

    /// Tag length in bytes.
    pub fn tag_len(&self) -> usize {
        usize::from(self.tag_bits / 8)
    }

    /// Checks every field against the limits of the chosen algorithms.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.iterations < 1 {
            return Err(config("iteration count must be >= 1"));
        }
        if self.iterations > MAX_ITERATIONS {
            return Err(config(format!(
                "iteration count must be <= {MAX_ITERATIONS}"
            )));
        }
        if self.salt_len < 1 || self.salt_len > MAX_SALT_LEN {
            return Err(config(format!(
                "salt length must be between 1 and {MAX_SALT_LEN} bytes"
            )));
        }

        if self.kdf == KdfAlgorithm::Argon2id {
            if self.salt_len < ARGON2_MIN_SALT_LEN {
                return Err(config("argon2 salt must be at least 8 bytes"));
            }
            if self.parallelism < 1 || self.parallelism > MAX_PARALLELISM {
                return Err(config(format!(
                    "argon2 parallelism must be between 1 and {MAX_PARALLELISM}"
                )));
            }
            if self.memory_kib < 8 * self.parallelism {
                return Err(config("argon2 memory cost must be at least 8 * parallelism"));
            }
            if self.memory_kib > MAX_MEMORY_KIB {
                return Err(config(format!(
                    "argon2 memory cost must be <= {MAX_MEMORY_KIB} KiB"
                )));
            }
        }

        if !self.aead.key_bits().contains(&self.key_bits) {
            return Err(config(format!(
                "{} does not accept {}-bit keys",
                self.aead, self.key_bits
            )));
        }
        if self.nonce_len != self.aead.nonce_len() {
            return Err(config(format!(
                "{} requires a {}-byte nonce, got {}",
                self.aead,
                self.aead.nonce_len(),
                self.nonce_len
            )));
        }
        if !self.aead.tag_bits().contains(&self.tag_bits) {
            return Err(config(format!(
                "{} does not accept {}-bit tags",
                self.aead, self.tag_bits
            )));
        }

        Ok(())
    }

    /// Canonical encoding, used both in the record header and as the
    /// associated data bound into the authentication tag.
    ///
    /// ```text
    /// KDF_ID (1) | ITERATIONS (4) | MEMORY_KIB (4) | PARALLELISM (4) | SALT_LEN (2)
    /// | KEY_BITS (2) | AEAD_ID (1) | NONCE_LEN (1) | TAG_BITS (2)
    /// ```
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut buf = [0u8; Self::LEN];
        let mut offset = 0;

        let mut put = |bytes: &[u8]| {
            buf[offset..offset + bytes.len()].copy_from_slice(bytes);
            offset += bytes.len();
        };

        put(&[self.kdf.id()]);
        put(&self.iterations.to_le_bytes());
        put(&self.memory_kib.to_le_bytes());
        put(&self.parallelism.to_le_bytes());
        put(&self.salt_len.to_le_bytes());
        put(&self.key_bits.to_le_bytes());
        put(&[self.aead.id()]);
        put(&[self.nonce_len]);
        put(&self.tag_bits.to_le_bytes());

        buf
    }

    /// Decodes the canonical encoding. Values are not range-checked here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedRecord`] if the input is short or names an
    /// unknown algorithm.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::LEN {
            return Err(Error::MalformedRecord("parameter block too short".into()));
        }

        let mut offset = 0;

        let kdf_id = data[offset];
        offset += KDF_ID_LEN;
        let kdf = KdfAlgorithm::from_id(kdf_id)
            .ok_or_else(|| Error::MalformedRecord(format!("unknown KDF id {kdf_id}")))?;

        let iterations = u32::from_le_bytes(le_array(data, offset)?);
        offset += ITER_LEN;

        let memory_kib = u32::from_le_bytes(le_array(data, offset)?);
        offset += MEM_LEN;

        let parallelism = u32::from_le_bytes(le_array(data, offset)?);
        offset += PAR_LEN;

        let salt_len = u16::from_le_bytes(le_array(data, offset)?);
        offset += SALT_LEN_LEN;

        let key_bits = u16::from_le_bytes(le_array(data, offset)?);
        offset += KEY_BITS_LEN;

        let aead_id = data[offset];
        offset += AEAD_ID_LEN;
        let aead = AeadAlgorithm::from_id(aead_id)
            .ok_or_else(|| Error::MalformedRecord(format!("unknown AEAD id {aead_id}")))?;

        let nonce_len = data[offset];
        offset += NONCE_LEN_LEN;

        let tag_bits = u16::from_le_bytes(le_array(data, offset)?);

        Ok(Self {
            kdf,
            iterations,
            memory_kib,
            parallelism,
            salt_len,
            key_bits,
            aead,
            nonce_len,
            tag_bits,
        })
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kdf:        {}", self.kdf)?;
        match self.kdf {
            KdfAlgorithm::Pbkdf2HmacSha256 => writeln!(f, " ({} iterations)", self.iterations)?,
            KdfAlgorithm::Argon2id => writeln!(
                f,
                " (t={}, m={} KiB, p={})",
                self.iterations, self.memory_kib, self.parallelism
            )?,
        }
        writeln!(f, "salt:       {} bytes", self.salt_len)?;
        writeln!(f, "aead:       {}", self.aead)?;
        writeln!(f, "key:        {} bits", self.key_bits)?;
        writeln!(f, "nonce:      {} bytes", self.nonce_len)?;
        write!(f, "tag:        {} bits", self.tag_bits)
    }
}

fn config(msg: impl Into<String>) -> Error {
    Error::Configuration(msg.into())
}

fn le_array<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N]> {
    data.get(offset..offset + N)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| Error::MalformedRecord("parameter block too short".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let p = ParameterSet::default();
        assert_eq!(p.kdf(), KdfAlgorithm::Pbkdf2HmacSha256);
        assert_eq!(p.iterations(), 65_536);
        assert_eq!(p.salt_len(), 32);
        assert_eq!(p.key_bits(), 256);
        assert_eq!(p.key_len(), 32);
        assert_eq!(p.aead(), AeadAlgorithm::AesGcm);
        assert_eq!(p.nonce_len(), 12);
        assert_eq!(p.tag_bits(), 128);
        assert_eq!(p.tag_len(), 16);
        p.validate().unwrap();
    }

    #[test]
    fn overrides_leave_original_untouched() {
        let base = ParameterSet::default();
        let custom = base.with_iterations(10_000).with_salt_len(16);

        assert_eq!(base.iterations(), 65_536);
        assert_eq!(base.salt_len(), 32);
        assert_eq!(custom.iterations(), 10_000);
        assert_eq!(custom.salt_len(), 16);
        assert_ne!(base, custom);
    }

    #[test]
    fn zero_iterations_rejected() {
        let p = ParameterSet::default().with_iterations(0);
        assert!(matches!(p.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn excessive_iterations_rejected() {
        let p = ParameterSet::default().with_iterations(MAX_ITERATIONS + 1);
        assert!(matches!(p.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn salt_length_bounds() {
        assert!(ParameterSet::default().with_salt_len(0).validate().is_err());
        assert!(ParameterSet::default().with_salt_len(1).validate().is_ok());
        assert!(
            ParameterSet::default()
                .with_salt_len(MAX_SALT_LEN + 1)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn gcm_tag_lengths() {
        for bits in [96, 104, 112, 120, 128] {
            ParameterSet::default().with_tag_bits(bits).validate().unwrap();
        }
        for bits in [0, 32, 64, 88, 100, 136, 256] {
            assert!(
                ParameterSet::default().with_tag_bits(bits).validate().is_err(),
                "{bits}-bit tag accepted"
            );
        }
    }

    #[test]
    fn gcm_key_lengths() {
        for bits in [128, 192, 256] {
            ParameterSet::default().with_key_bits(bits).validate().unwrap();
        }
        assert!(ParameterSet::default().with_key_bits(512).validate().is_err());
        assert!(ParameterSet::default().with_key_bits(0).validate().is_err());
    }

    #[test]
    fn nonce_must_match_algorithm() {
        assert!(ParameterSet::default().with_nonce_len(16).validate().is_err());

        let x = ParameterSet::default().with_aead(AeadAlgorithm::XChaCha20Poly1305);
        assert_eq!(x.nonce_len(), 24);
        x.validate().unwrap();
        assert!(x.with_tag_bits(96).validate().is_err());
        assert!(x.with_key_bits(128).validate().is_err());
    }

    #[test]
    fn argon2_limits() {
        let p = ParameterSet::argon2id();
        assert_eq!(p.iterations(), DEFAULT_ARGON2_TIME_COST);
        p.validate().unwrap();

        assert!(p.with_salt_len(4).validate().is_err());
        assert!(p.with_parallelism(0).validate().is_err());
        assert!(p.with_memory_kib(4).validate().is_err());
        assert!(p.with_memory_kib(MAX_MEMORY_KIB + 1).validate().is_err());
        // PBKDF2 ignores the Argon2 fields entirely.
        ParameterSet::default().with_memory_kib(0).validate().unwrap();
    }

    #[test]
    fn canonical_encoding_roundtrip() {
        let p = ParameterSet::argon2id()
            .with_memory_kib(32 * 1024)
            .with_parallelism(2)
            .with_salt_len(16)
            .with_aead(AeadAlgorithm::XChaCha20Poly1305);

        let bytes = p.to_bytes();
        assert_eq!(bytes.len(), ParameterSet::LEN);
        assert_eq!(ParameterSet::from_bytes(&bytes).unwrap(), p);
    }

    #[test]
    fn unknown_algorithm_ids_rejected() {
        let mut bytes = ParameterSet::default().to_bytes();
        bytes[0] = 99;
        assert!(matches!(
            ParameterSet::from_bytes(&bytes),
            Err(Error::MalformedRecord(_))
        ));

        let mut bytes = ParameterSet::default().to_bytes();
        bytes[17] = 0;
        assert!(matches!(
            ParameterSet::from_bytes(&bytes),
            Err(Error::MalformedRecord(_))
        ));
    }

    #[test]
    fn short_parameter_block_rejected() {
        let bytes = ParameterSet::default().to_bytes();
        assert!(ParameterSet::from_bytes(&bytes[..ParameterSet::LEN - 1]).is_err());
    }

    #[test]
    fn algorithm_names_parse() {
        assert_eq!(
            "pbkdf2-hmac-sha256".parse::<KdfAlgorithm>().unwrap(),
            KdfAlgorithm::Pbkdf2HmacSha256
        );
        assert_eq!("Argon2id".parse::<KdfAlgorithm>().unwrap(), KdfAlgorithm::Argon2id);
        assert_eq!("aes-gcm".parse::<AeadAlgorithm>().unwrap(), AeadAlgorithm::AesGcm);
        assert_eq!(
            "xchacha20-poly1305".parse::<AeadAlgorithm>().unwrap(),
            AeadAlgorithm::XChaCha20Poly1305
        );
        assert!("rc4".parse::<AeadAlgorithm>().is_err());
    }

    #[test]
    fn serde_uses_algorithm_names() {
        let json = serde_json::to_value(ParameterSet::default()).unwrap();
        assert_eq!(json["kdf"], "pbkdf2-hmac-sha256");
        assert_eq!(json["aead"], "aes-gcm");
        assert_eq!(json["iterations"], 65_536);
    }
}
