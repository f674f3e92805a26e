//! [`RsaService`]: PKCS#1 v1.5 RSA operations with base64 framing.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::rngs::OsRng;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Pkcs1v15Encrypt, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::info;

/// Default location of the PKCS#8 private key.
pub const DEFAULT_PRIVATE_KEY_PATH: &str = "keys/rsa_private_key_pkcs8.pem";

/// Default location of the SPKI public key.
pub const DEFAULT_PUBLIC_KEY_PATH: &str = "keys/rsa_public_key.pub";

/// Minimum number of 0xFF bytes in a PKCS#1 type-1 padding block.
const MIN_PAD_LEN: usize = 8;

/// Errors produced by the RSA layer.
#[derive(Debug, Error)]
pub enum RsaError {
    /// The key file could not be read.
    #[error("failed to read key file {path}: {source}")]
    KeyFile {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The PEM text is not a usable key.
    #[error("invalid {kind} key: {reason}")]
    KeyLoad {
        /// `"private"` or `"public"`.
        kind: &'static str,
        /// Parser message.
        reason: String,
    },

    /// A private-key operation was requested on a public-only service.
    #[error("this operation requires a private key")]
    MissingPrivateKey,

    /// The RSA primitive refused to encrypt (usually: input too long).
    #[error("the data could not be encrypted")]
    Encryption,

    /// The RSA primitive could not decrypt, or the padding is invalid.
    #[error("the data could not be decrypted")]
    Decryption,

    /// The ciphertext is not valid base64.
    #[error("the ciphertext is not valid base64")]
    Encoding,

    /// The payload could not be converted to or from its serialised form.
    #[error("the payload could not be serialised: {0}")]
    Payload(#[source] serde_json::Error),
}

/// RSA encrypt/decrypt wrapper over a single key pair or public key.
///
/// "Private encrypt" / "public decrypt" use PKCS#1 v1.5 type-1 padding
/// without a digest prefix (the raw signature primitive). "Public encrypt" /
/// "private decrypt" use PKCS#1 v1.5 type-2 encryption padding.
#[derive(Clone)]
pub struct RsaService {
    private: Option<RsaPrivateKey>,
    public: RsaPublicKey,
}

impl RsaService {
    /// Load a private key from PEM text (PKCS#8, or PKCS#1 as a fallback).
    ///
    /// # Errors
    ///
    /// Returns [`RsaError::KeyLoad`] if the text is not a valid RSA private key.
    pub fn from_private_pem(pem: &str) -> Result<Self, RsaError> {
        let private = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|pkcs8_err| {
                RsaPrivateKey::from_pkcs1_pem(pem).map_err(|_| pkcs8_err)
            })
            .map_err(|e| RsaError::KeyLoad {
                kind: "private",
                reason: e.to_string(),
            })?;
        let public = RsaPublicKey::from(&private);
        Ok(Self {
            private: Some(private),
            public,
        })
    }

    /// Load a public key from SPKI PEM text.
    ///
    /// # Errors
    ///
    /// Returns [`RsaError::KeyLoad`] if the text is not a valid RSA public key.
    pub fn from_public_pem(pem: &str) -> Result<Self, RsaError> {
        let public = RsaPublicKey::from_public_key_pem(pem).map_err(|e| RsaError::KeyLoad {
            kind: "public",
            reason: e.to_string(),
        })?;
        Ok(Self {
            private: None,
            public,
        })
    }

    /// Read and load a private key file.
    ///
    /// # Errors
    ///
    /// Returns [`RsaError::KeyFile`] or [`RsaError::KeyLoad`].
    pub fn from_private_key_file(path: impl AsRef<Path>) -> Result<Self, RsaError> {
        let svc = Self::from_private_pem(&read_key_file(path.as_ref())?)?;
        info!(path = %path.as_ref().display(), bits = svc.bits(), "RSA private key loaded");
        Ok(svc)
    }

    /// Read and load a public key file.
    ///
    /// # Errors
    ///
    /// Returns [`RsaError::KeyFile`] or [`RsaError::KeyLoad`].
    pub fn from_public_key_file(path: impl AsRef<Path>) -> Result<Self, RsaError> {
        let svc = Self::from_public_pem(&read_key_file(path.as_ref())?)?;
        info!(path = %path.as_ref().display(), bits = svc.bits(), "RSA public key loaded");
        Ok(svc)
    }

    /// Returns `true` if private-key operations are available.
    pub fn has_private_key(&self) -> bool {
        self.private.is_some()
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.public.size() * 8
    }

    /// Largest payload, in bytes, that a single operation can carry.
    pub fn max_payload_len(&self) -> usize {
        self.public.size().saturating_sub(11)
    }

    /// Serialise `data` as JSON and encrypt it under the private key.
    ///
    /// # Errors
    ///
    /// See [`RsaService::private_encrypt_raw`].
    pub fn private_encrypt<T: Serialize + ?Sized>(&self, data: &T) -> Result<String, RsaError> {
        self.private_encrypt_raw(&to_json(data)?)
    }

    /// Encrypt `data` under the private key (type-1 padding) and base64 it.
    ///
    /// # Errors
    ///
    /// Returns [`RsaError::MissingPrivateKey`] on a public-only service and
    /// [`RsaError::Encryption`] if `data` exceeds [`RsaService::max_payload_len`].
    pub fn private_encrypt_raw(&self, data: &[u8]) -> Result<String, RsaError> {
        let private = self.private.as_ref().ok_or(RsaError::MissingPrivateKey)?;
        let encrypted = private
            .sign_with_rng(&mut OsRng, Pkcs1v15Sign::new_unprefixed(), data)
            .map_err(|_| RsaError::Encryption)?;
        Ok(STANDARD.encode(encrypted))
    }

    /// Decrypt with the private key and deserialise the JSON payload.
    ///
    /// # Errors
    ///
    /// See [`RsaService::private_decrypt_raw`]; also [`RsaError::Payload`].
    pub fn private_decrypt<T: DeserializeOwned>(&self, data: &str) -> Result<T, RsaError> {
        from_json(&self.private_decrypt_raw(data)?)
    }

    /// Decode base64 `data` and decrypt it with the private key (type-2 padding).
    ///
    /// # Errors
    ///
    /// Returns [`RsaError::MissingPrivateKey`], [`RsaError::Encoding`] or
    /// [`RsaError::Decryption`].
    pub fn private_decrypt_raw(&self, data: &str) -> Result<Vec<u8>, RsaError> {
        let private = self.private.as_ref().ok_or(RsaError::MissingPrivateKey)?;
        let ciphertext = decode_base64(data)?;
        private
            .decrypt(Pkcs1v15Encrypt, &ciphertext)
            .map_err(|_| RsaError::Decryption)
    }

    /// Serialise `data` as JSON and encrypt it under the public key.
    ///
    /// # Errors
    ///
    /// See [`RsaService::public_encrypt_raw`].
    pub fn public_encrypt<T: Serialize + ?Sized>(&self, data: &T) -> Result<String, RsaError> {
        self.public_encrypt_raw(&to_json(data)?)
    }

    /// Encrypt `data` under the public key (type-2 padding) and base64 it.
    ///
    /// # Errors
    ///
    /// Returns [`RsaError::Encryption`] if `data` exceeds
    /// [`RsaService::max_payload_len`].
    pub fn public_encrypt_raw(&self, data: &[u8]) -> Result<String, RsaError> {
        let encrypted = self
            .public
            .encrypt(&mut OsRng, Pkcs1v15Encrypt, data)
            .map_err(|_| RsaError::Encryption)?;
        Ok(STANDARD.encode(encrypted))
    }

    /// Decrypt with the public key and deserialise the JSON payload.
    ///
    /// # Errors
    ///
    /// See [`RsaService::public_decrypt_raw`]; also [`RsaError::Payload`].
    pub fn public_decrypt<T: DeserializeOwned>(&self, data: &str) -> Result<T, RsaError> {
        from_json(&self.public_decrypt_raw(data)?)
    }

    /// Decode base64 `data`, apply the public exponent and strip type-1 padding.
    ///
    /// # Errors
    ///
    /// Returns [`RsaError::Encoding`] or [`RsaError::Decryption`].
    pub fn public_decrypt_raw(&self, data: &str) -> Result<Vec<u8>, RsaError> {
        let ciphertext = decode_base64(data)?;
        let k = self.public.size();
        if ciphertext.len() != k {
            return Err(RsaError::Decryption);
        }

        let c = BigUint::from_bytes_be(&ciphertext);
        if &c >= self.public.n() {
            return Err(RsaError::Decryption);
        }
        let m = c.modpow(self.public.e(), self.public.n()).to_bytes_be();
        if m.len() > k {
            return Err(RsaError::Decryption);
        }

        let mut em = vec![0u8; k - m.len()];
        em.extend_from_slice(&m);
        strip_type1_padding(&em).ok_or(RsaError::Decryption)
    }
}

impl std::fmt::Debug for RsaService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaService")
            .field("bits", &self.bits())
            .field("private", &self.has_private_key())
            .finish()
    }
}

/// `00 01 FF.. 00 data` → `data`.
fn strip_type1_padding(em: &[u8]) -> Option<Vec<u8>> {
    let rest = em.strip_prefix(&[0x00, 0x01])?;
    let sep = rest.iter().position(|&b| b != 0xFF)?;
    if sep < MIN_PAD_LEN || rest[sep] != 0x00 {
        return None;
    }
    Some(rest[sep + 1..].to_vec())
}

fn read_key_file(path: &Path) -> Result<String, RsaError> {
    std::fs::read_to_string(path).map_err(|source| RsaError::KeyFile {
        path: path.display().to_string(),
        source,
    })
}

fn decode_base64(data: &str) -> Result<Vec<u8>, RsaError> {
    STANDARD.decode(data.trim()).map_err(|_| RsaError::Encoding)
}

fn to_json<T: Serialize + ?Sized>(data: &T) -> Result<Vec<u8>, RsaError> {
    serde_json::to_vec(data).map_err(RsaError::Payload)
}

fn from_json<T: DeserializeOwned>(data: &[u8]) -> Result<T, RsaError> {
    serde_json::from_slice(data).map_err(RsaError::Payload)
}
