//! [`Envelope`]: the signed record carried inside every encoded value.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use super::cipher::CipherError;

/// One encrypted value as it travels on the wire, before the outer base64.
///
/// The JSON text of this record is base64-encoded to produce the opaque
/// string returned by [`EnvelopeCipher::encode`](super::EnvelopeCipher::encode).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Base64 of the random IV.
    pub iv: String,
    /// Base64 of the AES-CBC ciphertext.
    pub value: String,
    /// Lowercase hex HMAC-SHA256 over `iv` followed by `value`.
    pub sign: String,
}

impl Envelope {
    /// Serialise to JSON and base64-encode the result.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Framing`] if the record cannot be serialised.
    pub fn to_wire(&self) -> Result<String, CipherError> {
        let json = serde_json::to_vec(self).map_err(CipherError::Framing)?;
        Ok(STANDARD.encode(json))
    }

    /// Parse the opaque string produced by [`Envelope::to_wire`].
    ///
    /// Surrounding whitespace is ignored. Unknown fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::IncompleteData`] if the input is not base64, is
    /// not a JSON object, or lacks any of `iv`, `value`, `sign` as strings.
    pub fn from_wire(input: &str) -> Result<Self, CipherError> {
        let json = STANDARD
            .decode(input.trim())
            .map_err(|_| CipherError::IncompleteData)?;
        serde_json::from_slice(&json).map_err(|_| CipherError::IncompleteData)
    }

    /// Strictly decode the `iv` field, requiring exactly `iv_len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::IncompleteData`] if `iv` is not base64 or has
    /// the wrong length.
    pub fn iv_bytes(&self, iv_len: usize) -> Result<Vec<u8>, CipherError> {
        let iv = STANDARD
            .decode(&self.iv)
            .map_err(|_| CipherError::IncompleteData)?;
        if iv.len() != iv_len {
            return Err(CipherError::IncompleteData);
        }
        Ok(iv)
    }
}
