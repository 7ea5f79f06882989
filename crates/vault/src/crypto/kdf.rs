//! PBKDF2-HMAC-SHA512 derivation of per-envelope keys from the master secret.

use hmac::Hmac;
use sha2::Sha512;
use zeroize::Zeroizing;

use super::FieldCryptoError;

/// Byte length of the random salt stored at the front of every envelope.
pub const SALT_LEN: usize = 64;

/// Byte length of a derived AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Lowest accepted PBKDF2 iteration count.
pub const MIN_ITERATIONS: u32 = 100_000;

/// Iteration count used when none is configured.
pub const DEFAULT_ITERATIONS: u32 = MIN_ITERATIONS;

/// The process-wide master secret.
///
/// Lives only in memory and is zeroed when dropped.
pub struct MasterSecret(Zeroizing<Vec<u8>>);

impl MasterSecret {
    /// Wrap raw secret bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FieldCryptoError::KeyDerivation`] if `bytes` is empty.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, FieldCryptoError> {
        let bytes: Zeroizing<Vec<u8>> = Zeroizing::new(bytes.into());
        if bytes.is_empty() {
            return Err(FieldCryptoError::KeyDerivation("master secret is empty"));
        }
        Ok(Self(bytes))
    }

    fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterSecret([REDACTED])")
    }
}

/// A key derived for one envelope. Never persisted; zeroed on drop.
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl DerivedKey {
    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derives [`DerivedKey`]s from a fixed [`MasterSecret`].
///
/// Deterministic: the same salt always yields the same key, which is what lets
/// decryption regenerate the key from the salt stored in the envelope.
#[derive(Debug)]
pub struct KeyDeriver {
    secret: MasterSecret,
    iterations: u32,
}

impl KeyDeriver {
    /// Build a deriver for `secret` running `iterations` PBKDF2 rounds.
    ///
    /// # Errors
    ///
    /// Returns [`FieldCryptoError::KeyDerivation`] if `iterations` is below
    /// [`MIN_ITERATIONS`].
    pub fn new(secret: MasterSecret, iterations: u32) -> Result<Self, FieldCryptoError> {
        if iterations < MIN_ITERATIONS {
            return Err(FieldCryptoError::KeyDerivation(
                "iteration count below minimum",
            ));
        }
        Ok(Self { secret, iterations })
    }

    /// Low-cost deriver for unit tests.
    #[cfg(test)]
    pub(crate) fn for_tests(secret: &[u8]) -> Self {
        Self {
            secret: MasterSecret::new(secret).expect("test secret must be non-empty"),
            iterations: 1_000,
        }
    }

    /// Configured iteration count.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Derive the key for `salt`.
    ///
    /// # Errors
    ///
    /// Returns [`FieldCryptoError::KeyDerivation`] if `salt` is not exactly
    /// [`SALT_LEN`] bytes or the PRF rejects the output length.
    pub fn derive(&self, salt: &[u8]) -> Result<DerivedKey, FieldCryptoError> {
        if salt.len() != SALT_LEN {
            return Err(FieldCryptoError::KeyDerivation("salt has wrong length"));
        }
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        pbkdf2::pbkdf2::<Hmac<Sha512>>(self.secret.expose(), salt, self.iterations, &mut key[..])
            .map_err(|_| FieldCryptoError::KeyDerivation("PRF rejected output length"))?;
        Ok(DerivedKey(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_salt_same_key() {
        let deriver = KeyDeriver::for_tests(b"correct horse");
        let salt = [7u8; SALT_LEN];
        let a = deriver.derive(&salt).unwrap();
        let b = deriver.derive(&salt).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_salt_different_key() {
        let deriver = KeyDeriver::for_tests(b"correct horse");
        let a = deriver.derive(&[1u8; SALT_LEN]).unwrap();
        let b = deriver.derive(&[2u8; SALT_LEN]).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_secret_different_key() {
        let salt = [3u8; SALT_LEN];
        let a = KeyDeriver::for_tests(b"secret-a").derive(&salt).unwrap();
        let b = KeyDeriver::for_tests(b"secret-b").derive(&salt).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn rejects_short_salt() {
        let deriver = KeyDeriver::for_tests(b"secret");
        let err = deriver.derive(&[0u8; 16]).unwrap_err();
        assert!(matches!(err, FieldCryptoError::KeyDerivation(_)));
    }

    #[test]
    fn rejects_empty_secret() {
        assert!(MasterSecret::new(Vec::new()).is_err());
    }

    #[test]
    fn rejects_low_iteration_count() {
        let secret = MasterSecret::new(b"secret".to_vec()).unwrap();
        assert!(KeyDeriver::new(secret, MIN_ITERATIONS - 1).is_err());
    }

    #[test]
    fn accepts_minimum_iteration_count() {
        let secret = MasterSecret::new(b"secret".to_vec()).unwrap();
        let deriver = KeyDeriver::new(secret, MIN_ITERATIONS).unwrap();
        assert_eq!(deriver.iterations(), MIN_ITERATIONS);
    }

    #[test]
    fn secrets_redacted_in_debug() {
        let deriver = KeyDeriver::for_tests(b"hunter2");
        let rendered = format!("{deriver:?}");
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains("hunter2"));
        let key = deriver.derive(&[0u8; SALT_LEN]).unwrap();
        assert!(format!("{key:?}").contains("REDACTED"));
    }
}
