use thiserror::Error;

/// Errors produced by the field crypto layer.
///
/// None of these is transient: the same inputs reproduce the same failure, so
/// callers must not retry.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FieldCryptoError {
    /// Key derivation rejected its inputs (empty secret, bad salt length,
    /// iteration count below the floor) or the PRF could not run.
    #[error("key derivation failed: {0}")]
    KeyDerivation(&'static str),

    /// The AEAD primitive or the OS entropy source could not be used.
    #[error("cipher primitive unavailable")]
    CryptoUnavailable,

    /// The authentication tag did not verify: tampered data or wrong key.
    #[error("integrity check failed")]
    Integrity,

    /// The stored envelope is structurally invalid.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(&'static str),
}

impl FieldCryptoError {
    /// Short, detail-free class name suitable for audit records.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldCryptoError::KeyDerivation(_) => "key_derivation",
            FieldCryptoError::CryptoUnavailable => "crypto_unavailable",
            FieldCryptoError::Integrity => "integrity",
            FieldCryptoError::MalformedEnvelope(_) => "malformed_envelope",
        }
    }
}
