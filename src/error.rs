use thiserror::Error;

/// Every failure the crate can report.
///
/// Wrong passwords and tampered records both surface as
/// [`Error::AuthenticationFailed`]; callers cannot tell them apart.
#[derive(Debug, Error)]
pub enum Error {
    /// The parameter set handed to an operation is unusable.
    #[error("invalid parameter set: {0}")]
    Configuration(String),

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("OS random generator unavailable")]
    EntropyUnavailable,

    #[error("Invalid password or corrupted data")]
    AuthenticationFailed,

    /// Structurally invalid record: bad framing, lengths or encoding.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` for failures the process cannot recover from by
    /// changing its inputs.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::KeyDerivation(_) | Error::EntropyUnavailable)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_message_is_generic() {
        assert_eq!(
            Error::AuthenticationFailed.to_string(),
            "Invalid password or corrupted data"
        );
    }

    #[test]
    fn fatal_classification() {
        assert!(Error::EntropyUnavailable.is_fatal());
        assert!(Error::KeyDerivation("x".into()).is_fatal());
        assert!(!Error::AuthenticationFailed.is_fatal());
        assert!(!Error::Configuration("x".into()).is_fatal());
        assert!(!Error::MalformedRecord("x".into()).is_fatal());
    }
}
