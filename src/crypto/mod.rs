//! Cryptographic primitives for sealed records.
//!
//! Provides the parameter set, key derivation, authenticated encryption and
//! the OS randomness source.

pub mod aead;
pub mod kdf;
pub mod params;
pub mod random;

pub use aead::{open, seal};
pub use kdf::{DerivedKey, derive_key};
pub use params::{AeadAlgorithm, KdfAlgorithm, ParameterSet};
pub use random::{fill_random, generate_password, random_bytes};
