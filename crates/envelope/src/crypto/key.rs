//! [`KeyBytes`]: owned key material, plus key and IV generation.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroize;

use super::suite::CipherSuite;

/// Key buffer owned by a single cipher instance.
///
/// When this type is dropped, the memory is overwritten with zeroes to
/// minimise the window during which key material lives in RAM.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyBytes(Vec<u8>);

impl KeyBytes {
    /// Wrap raw key bytes. Length is checked by the caller against its suite.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    /// Borrow the key bytes.
    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for KeyBytes {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for KeyBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material, not even in debug builds.
        f.write_str("KeyBytes([REDACTED])")
    }
}

/// Fill a fresh buffer of `len` bytes from the OS CSPRNG.
pub(crate) fn random_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    OsRng.fill_bytes(&mut buf);
    buf
}

/// Generate a new random key for `suite` and return it base64-encoded.
///
/// The decoded key is always exactly [`CipherSuite::key_len`] bytes.
pub fn generate_key(suite: CipherSuite) -> String {
    let mut key = random_bytes(suite.key_len());
    let encoded = STANDARD.encode(&key);
    key.zeroize();
    encoded
}
