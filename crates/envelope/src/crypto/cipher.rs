//! AES-CBC encryption of arbitrary values into signed, self-describing envelopes.
//!
//! **Order of checks on decode:** the record shape and IV length are checked
//! first, then the HMAC tag, and only then is the ciphertext decrypted. A
//! tampered envelope never reaches the block cipher, so padding errors cannot
//! be used as an oracle.
//!
//! **Do NOT reuse an IV.** Every call to [`EnvelopeCipher::encode`] draws a
//! fresh IV from the OS CSPRNG; CBC loses semantic security otherwise.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::{alphabet, Engine as _};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use super::envelope::Envelope;
use super::key::{self, KeyBytes};
use super::sign::Signer;
use super::suite::CipherSuite;

/// Standard alphabet, `=` padding optional. Used for the configured key only.
const KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Errors produced by the envelope cipher.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key is not base64 or does not have the length the suite requires.
    #[error("invalid key: {suite} requires a {expected}-byte key")]
    KeyFormat {
        /// Suite the key was checked against.
        suite: CipherSuite,
        /// Required key length in bytes.
        expected: usize,
    },

    /// The block cipher refused to encrypt the payload.
    #[error("the data could not be encrypted")]
    Encryption,

    /// The envelope record could not be serialised.
    #[error("the envelope could not be framed: {0}")]
    Framing(#[source] serde_json::Error),

    /// The envelope is malformed, lacks a field, or carries a wrong-size IV.
    #[error("the envelope is incomplete or malformed")]
    IncompleteData,

    /// The envelope signature does not match its contents.
    #[error("the envelope signature is invalid")]
    InvalidSignature,

    /// The block cipher could not decrypt an authenticated envelope.
    #[error("the data could not be decrypted")]
    Decryption,

    /// The payload could not be converted to or from its serialised form.
    #[error("the payload could not be serialised: {0}")]
    Payload(#[source] serde_json::Error),
}

/// Symmetric envelope cipher bound to one key and one [`CipherSuite`].
///
/// Immutable after construction; share it freely across threads.
#[derive(Debug, Clone)]
pub struct EnvelopeCipher {
    key: KeyBytes,
    suite: CipherSuite,
    signer: Signer,
}

impl EnvelopeCipher {
    /// Build a cipher from a base64-encoded key.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::KeyFormat`] if `base64_key` is not valid base64
    /// or does not decode to exactly [`CipherSuite::key_len`] bytes. Trailing
    /// `=` padding may be omitted.
    pub fn new(base64_key: &str, suite: CipherSuite) -> Result<Self, CipherError> {
        let bytes = KEY_ENGINE
            .decode(base64_key.trim())
            .map_err(|_| key_format(suite))?;
        Self::from_key_bytes(&bytes, suite)
    }

    /// Build an AES-128-CBC cipher from a base64-encoded key.
    ///
    /// # Errors
    ///
    /// See [`EnvelopeCipher::new`].
    pub fn with_default_suite(base64_key: &str) -> Result<Self, CipherError> {
        Self::new(base64_key, CipherSuite::default())
    }

    /// Build a cipher from raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::KeyFormat`] if `key` is not exactly
    /// [`CipherSuite::key_len`] bytes.
    pub fn from_key_bytes(key: &[u8], suite: CipherSuite) -> Result<Self, CipherError> {
        let key = KeyBytes::new(key.to_vec());
        if key.len() != suite.key_len() {
            return Err(key_format(suite));
        }
        let signer = Signer::new(key.expose()).map_err(|_| key_format(suite))?;
        Ok(Self { key, suite, signer })
    }

    /// Generate a fresh base64 key suitable for `suite`.
    pub fn generate_key(suite: CipherSuite) -> String {
        key::generate_key(suite)
    }

    /// The suite this cipher was built for.
    pub fn suite(&self) -> CipherSuite {
        self.suite
    }

    /// Serialise `payload` as JSON, encrypt it, and return the envelope string.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Payload`] if `payload` cannot be serialised,
    /// [`CipherError::Encryption`] or [`CipherError::Framing`] on primitive or
    /// framing failure.
    pub fn encode<T: Serialize + ?Sized>(&self, payload: &T) -> Result<String, CipherError> {
        let plaintext = serde_json::to_vec(payload).map_err(CipherError::Payload)?;
        self.encode_raw(&plaintext)
    }

    /// Encrypt `plaintext` as-is and return the envelope string.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Encryption`] or [`CipherError::Framing`].
    pub fn encode_raw(&self, plaintext: &[u8]) -> Result<String, CipherError> {
        let iv = key::random_bytes(self.suite.iv_len());
        self.seal(&iv, plaintext)?.to_wire()
    }

    /// Decode an envelope string and deserialise the JSON payload inside it.
    ///
    /// # Errors
    ///
    /// Everything [`EnvelopeCipher::decode_raw`] returns, plus
    /// [`CipherError::Payload`] if the plaintext is not valid JSON for `T`.
    pub fn decode<T: DeserializeOwned>(&self, envelope: &str) -> Result<T, CipherError> {
        let plaintext = self.decode_raw(envelope)?;
        serde_json::from_slice(&plaintext).map_err(CipherError::Payload)
    }

    /// Verify and decrypt an envelope string, returning the plaintext bytes.
    ///
    /// # Errors
    ///
    /// - [`CipherError::IncompleteData`] if the envelope is malformed or its IV
    ///   has the wrong length.
    /// - [`CipherError::InvalidSignature`] if the tag does not match.
    /// - [`CipherError::Decryption`] if the authenticated ciphertext cannot be
    ///   decrypted.
    pub fn decode_raw(&self, envelope: &str) -> Result<Vec<u8>, CipherError> {
        let record = Envelope::from_wire(envelope)?;
        let iv = record.iv_bytes(self.suite.iv_len())?;

        if !self.signer.verify(&record.iv, &record.value, &record.sign) {
            return Err(CipherError::InvalidSignature);
        }

        let ciphertext = STANDARD
            .decode(&record.value)
            .map_err(|_| CipherError::Decryption)?;
        self.decrypt(&iv, &ciphertext)
    }

    /// Encrypt and sign `plaintext` under the given IV.
    fn seal(&self, iv: &[u8], plaintext: &[u8]) -> Result<Envelope, CipherError> {
        let ciphertext = self.encrypt(iv, plaintext)?;
        let iv = STANDARD.encode(iv);
        let value = STANDARD.encode(ciphertext);
        let sign = self.signer.hash(&iv, &value);
        Ok(Envelope { iv, value, sign })
    }

    fn encrypt(&self, iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let key = self.key.expose();
        let ciphertext = match self.suite {
            CipherSuite::Aes128Cbc => Aes128CbcEnc::new_from_slices(key, iv)
                .map_err(|_| CipherError::Encryption)?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
            CipherSuite::Aes256Cbc => Aes256CbcEnc::new_from_slices(key, iv)
                .map_err(|_| CipherError::Encryption)?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        };
        Ok(ciphertext)
    }

    fn decrypt(&self, iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let key = self.key.expose();
        match self.suite {
            CipherSuite::Aes128Cbc => Aes128CbcDec::new_from_slices(key, iv)
                .map_err(|_| CipherError::Decryption)?
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
            CipherSuite::Aes256Cbc => Aes256CbcDec::new_from_slices(key, iv)
                .map_err(|_| CipherError::Decryption)?
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        }
        .map_err(|_| CipherError::Decryption)
    }
}

fn key_format(suite: CipherSuite) -> CipherError {
    CipherError::KeyFormat {
        suite,
        expected: suite.key_len(),
    }
}
