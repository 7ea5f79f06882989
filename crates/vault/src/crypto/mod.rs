//! Field-level encryption at rest.
//!
//! This module is intentionally free of HTTP and authorization dependencies.
//! Callers run the access policy check first; nothing here enforces it.
//!
//! # Envelope format
//!
//! ```text
//! base64( salt[64] || nonce[12] || tag[16] || ciphertext )
//! ```
//!
//! The key for each envelope is PBKDF2-HMAC-SHA512(master secret, salt). The
//! segment lengths are fixed; changing any of them invalidates every stored
//! envelope.

pub mod cipher;
pub mod envelope;
mod error;
pub mod field;
pub mod kdf;

pub use error::FieldCryptoError;
pub use field::FieldEncryptionService;
pub use kdf::{KeyDeriver, MasterSecret};
