//! Packing of salt, nonce, tag and ciphertext into one storable string.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::cipher::{NONCE_LEN, TAG_LEN};
use super::kdf::SALT_LEN;
use super::FieldCryptoError;

/// Combined length of the fixed-size segments that precede the ciphertext.
pub const HEADER_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

/// A parsed envelope.
///
/// Decoded byte layout:
///
/// ```text
/// [0, 64)    salt
/// [64, 76)   nonce
/// [76, 92)   tag
/// [92, end)  ciphertext
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Salt the key was derived from.
    pub salt: [u8; SALT_LEN],
    /// AEAD nonce.
    pub nonce: [u8; NONCE_LEN],
    /// Detached authentication tag.
    pub tag: [u8; TAG_LEN],
    /// Ciphertext bytes; may be empty.
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Concatenate the segments and base64-encode the result.
    pub fn pack(&self) -> String {
        let mut raw = Vec::with_capacity(HEADER_LEN + self.ciphertext.len());
        raw.extend_from_slice(&self.salt);
        raw.extend_from_slice(&self.nonce);
        raw.extend_from_slice(&self.tag);
        raw.extend_from_slice(&self.ciphertext);
        STANDARD.encode(raw)
    }

    /// Decode and split a packed envelope.
    ///
    /// # Errors
    ///
    /// Returns [`FieldCryptoError::MalformedEnvelope`] if `packed` is not valid
    /// base64 or decodes to fewer than [`HEADER_LEN`] bytes.
    pub fn unpack(packed: &str) -> Result<Self, FieldCryptoError> {
        let raw = STANDARD
            .decode(packed.trim())
            .map_err(|_| FieldCryptoError::MalformedEnvelope("not valid base64"))?;
        if raw.len() < HEADER_LEN {
            return Err(FieldCryptoError::MalformedEnvelope("envelope truncated"));
        }

        let (salt_bytes, rest) = raw.split_at(SALT_LEN);
        let (nonce_bytes, rest) = rest.split_at(NONCE_LEN);
        let (tag_bytes, ciphertext) = rest.split_at(TAG_LEN);

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(salt_bytes);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(nonce_bytes);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(tag_bytes);

        Ok(Self {
            salt,
            nonce,
            tag,
            ciphertext: ciphertext.to_vec(),
        })
    }
}
