//! [`FieldEncryptionService`]: encrypts and decrypts individual field values.

use super::cipher::{self, NONCE_LEN};
use super::envelope::Envelope;
use super::kdf::{KeyDeriver, SALT_LEN};
use super::FieldCryptoError;

/// Turns plaintext field values into envelopes and back.
///
/// Holds no mutable state; share it across threads behind an `Arc`. It knows
/// nothing about which fields are sensitive, and it performs no authorization.
/// Callers must pass the access policy check before invoking it.
#[derive(Debug)]
pub struct FieldEncryptionService {
    deriver: KeyDeriver,
}

impl FieldEncryptionService {
    /// Create a service that derives every key from `deriver`'s master secret.
    pub fn new(deriver: KeyDeriver) -> Self {
        Self { deriver }
    }

    /// Encrypt a text field into a packed envelope.
    ///
    /// Each call draws a fresh salt and nonce, so encrypting the same value
    /// twice gives two different envelopes.
    ///
    /// # Errors
    ///
    /// Propagates [`FieldCryptoError::KeyDerivation`] and
    /// [`FieldCryptoError::CryptoUnavailable`].
    pub fn encrypt_field(&self, plaintext: &str) -> Result<String, FieldCryptoError> {
        self.seal_bytes(plaintext.as_bytes())
    }

    /// Decrypt a packed envelope back into its text value.
    ///
    /// # Errors
    ///
    /// Returns [`FieldCryptoError::MalformedEnvelope`] for structurally bad
    /// input or a non-UTF-8 payload, and [`FieldCryptoError::Integrity`] if the
    /// tag does not verify.
    pub fn decrypt_field(&self, envelope: &str) -> Result<String, FieldCryptoError> {
        let bytes = self.open_bytes(envelope)?;
        String::from_utf8(bytes)
            .map_err(|_| FieldCryptoError::MalformedEnvelope("payload is not UTF-8"))
    }

    /// Byte-level form of [`Self::encrypt_field`].
    pub fn seal_bytes(&self, plaintext: &[u8]) -> Result<String, FieldCryptoError> {
        let mut salt = [0u8; SALT_LEN];
        cipher::fill_random(&mut salt)?;
        let mut nonce = [0u8; NONCE_LEN];
        cipher::fill_random(&mut nonce)?;

        let key = self.deriver.derive(&salt)?;
        let (ciphertext, tag) = cipher::seal(plaintext, &key, &nonce)?;

        Ok(Envelope {
            salt,
            nonce,
            tag,
            ciphertext,
        }
        .pack())
    }

    /// Byte-level form of [`Self::decrypt_field`].
    pub fn open_bytes(&self, envelope: &str) -> Result<Vec<u8>, FieldCryptoError> {
        let env = Envelope::unpack(envelope)?;
        let key = self.deriver.derive(&env.salt)?;
        cipher::open(&env.ciphertext, &key, &env.nonce, &env.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::envelope::HEADER_LEN;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    fn service() -> FieldEncryptionService {
        FieldEncryptionService::new(KeyDeriver::for_tests(b"test-master-secret"))
    }

    fn flip_byte(envelope: &str, index: usize) -> String {
        let mut raw = STANDARD.decode(envelope).unwrap();
        raw[index] ^= 0x01;
        STANDARD.encode(raw)
    }

    #[test]
    fn ssn_round_trip() {
        let svc = service();
        let envelope = svc.encrypt_field("123-45-6789").unwrap();
        assert_eq!(svc.decrypt_field(&envelope).unwrap(), "123-45-6789");

        let decoded = STANDARD.decode(&envelope).unwrap();
        assert!(decoded.len() > HEADER_LEN);
    }

    #[test]
    fn round_trips_assorted_values() {
        let svc = service();
        for value in ["", "a", "Penicillin allergy; see note 4", "Zoë Ångström 診断", "x\n\ty\0z"] {
            let envelope = svc.encrypt_field(value).unwrap();
            assert_eq!(svc.decrypt_field(&envelope).unwrap(), value);
        }
    }

    #[test]
    fn same_plaintext_gives_distinct_envelopes() {
        let svc = service();
        let a = svc.encrypt_field("Hypertension").unwrap();
        let b = svc.encrypt_field("Hypertension").unwrap();
        assert_ne!(a, b);
        assert_eq!(svc.decrypt_field(&a).unwrap(), svc.decrypt_field(&b).unwrap());
    }

    #[test]
    fn any_flipped_tag_or_ciphertext_byte_fails_integrity() {
        let svc = service();
        let envelope = svc.encrypt_field("Type 2 diabetes").unwrap();
        let total = STANDARD.decode(&envelope).unwrap().len();
        let tag_start = HEADER_LEN - cipher::TAG_LEN;
        for index in tag_start..total {
            let tampered = flip_byte(&envelope, index);
            assert_eq!(
                svc.decrypt_field(&tampered).unwrap_err(),
                FieldCryptoError::Integrity,
                "byte {index} was not authenticated"
            );
        }
    }

    #[test]
    fn flipped_salt_fails_integrity() {
        let svc = service();
        let envelope = svc.encrypt_field("secret").unwrap();
        let tampered = flip_byte(&envelope, 0);
        assert_eq!(
            svc.decrypt_field(&tampered).unwrap_err(),
            FieldCryptoError::Integrity
        );
    }

    #[test]
    fn wrong_master_secret_fails_integrity() {
        let envelope = service().encrypt_field("secret").unwrap();
        let other = FieldEncryptionService::new(KeyDeriver::for_tests(b"rotated-secret"));
        assert_eq!(
            other.decrypt_field(&envelope).unwrap_err(),
            FieldCryptoError::Integrity
        );
    }

    #[test]
    fn truncated_envelope_is_malformed() {
        let svc = service();
        let short = STANDARD.encode([0u8; HEADER_LEN - 1]);
        assert!(matches!(
            svc.decrypt_field(&short),
            Err(FieldCryptoError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn non_utf8_payload_is_malformed() {
        let svc = service();
        let envelope = svc.seal_bytes(&[0xFF, 0xFE, 0xFD]).unwrap();
        assert_eq!(svc.open_bytes(&envelope).unwrap(), vec![0xFF, 0xFE, 0xFD]);
        assert!(matches!(
            svc.decrypt_field(&envelope),
            Err(FieldCryptoError::MalformedEnvelope(_))
        ));
    }
}
