//! AES-256-GCM-SIV sealing and opening with a detached authentication tag.
//!
//! **Algorithm choice:** AES-256-GCM-SIV (RFC 8452) is nonce-misuse-resistant.
//! Every envelope also gets its own derived key, so a repeated random nonce
//! would still not pair with the same key.
//!
//! **Do NOT substitute plain AES-256-GCM with a fixed nonce.** GCM nonce reuse
//! is catastrophic: it breaks both confidentiality and authentication.

use aes_gcm_siv::{
    aead::{rand_core::RngCore, AeadInPlace, KeyInit, OsRng},
    Aes256GcmSiv, Nonce, Tag,
};
use zeroize::Zeroize;

use super::kdf::DerivedKey;
use super::FieldCryptoError;

/// Byte length of an AES-GCM-SIV nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the authentication tag (16 bytes = 128 bits).
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` under `key` and `nonce`.
///
/// No associated data is bound.
///
/// # Errors
///
/// Returns [`FieldCryptoError::CryptoUnavailable`] if the cipher cannot be
/// initialised or the AEAD refuses the input.
pub fn seal(
    plaintext: &[u8],
    key: &DerivedKey,
    nonce: &[u8; NONCE_LEN],
) -> Result<(Vec<u8>, [u8; TAG_LEN]), FieldCryptoError> {
    let cipher = build_cipher(key)?;
    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(nonce), b"", &mut buffer)
        .map_err(|_| {
            buffer.zeroize();
            FieldCryptoError::CryptoUnavailable
        })?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(&tag);
    Ok((buffer, tag_bytes))
}

/// Decrypt `ciphertext` and verify `tag`.
///
/// Fails closed: on a tag mismatch the working buffer is wiped and no bytes
/// are returned. Tag comparison is constant-time inside `aes-gcm-siv`.
///
/// # Errors
///
/// Returns [`FieldCryptoError::Integrity`] if authentication fails (wrong key
/// or tampered data), [`FieldCryptoError::CryptoUnavailable`] if the cipher
/// cannot be initialised.
pub fn open(
    ciphertext: &[u8],
    key: &DerivedKey,
    nonce: &[u8; NONCE_LEN],
    tag: &[u8; TAG_LEN],
) -> Result<Vec<u8>, FieldCryptoError> {
    let cipher = build_cipher(key)?;
    let mut buffer = ciphertext.to_vec();
    match cipher.decrypt_in_place_detached(
        Nonce::from_slice(nonce),
        b"",
        &mut buffer,
        Tag::from_slice(tag),
    ) {
        Ok(()) => Ok(buffer),
        Err(_) => {
            buffer.zeroize();
            Err(FieldCryptoError::Integrity)
        }
    }
}

/// Fill `buf` from the OS CSPRNG.
///
/// # Errors
///
/// Returns [`FieldCryptoError::CryptoUnavailable`] if the entropy source fails.
pub fn fill_random(buf: &mut [u8]) -> Result<(), FieldCryptoError> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|_| FieldCryptoError::CryptoUnavailable)
}

fn build_cipher(key: &DerivedKey) -> Result<Aes256GcmSiv, FieldCryptoError> {
    Aes256GcmSiv::new_from_slice(key.as_bytes()).map_err(|_| FieldCryptoError::CryptoUnavailable)
}
