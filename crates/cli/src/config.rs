//! Configuration loading and validation for the `envelope` binary.
//!
//! All values are read from environment variables at startup.

use anyhow::{Context, Result};
use common::ServiceError;
use envelope::asymmetric::{DEFAULT_PRIVATE_KEY_PATH, DEFAULT_PUBLIC_KEY_PATH};
use envelope::{CipherSuite, EnvelopeCipher, RsaService};
use serde::Deserialize;

/// Validated CLI configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Base64 symmetric key. Required by `encode` and `decode` only.
    #[serde(default)]
    pub envelope_key: Option<String>,

    /// Cipher suite name, `AES-128-CBC` or `AES-256-CBC`.
    #[serde(default = "default_cipher_suite")]
    pub cipher_suite: String,

    /// PKCS#8 PEM file used by private-key RSA operations.
    #[serde(default = "default_rsa_private_key_path")]
    pub rsa_private_key_path: String,

    /// SPKI PEM file used by public-key RSA operations.
    #[serde(default = "default_rsa_public_key_path")]
    pub rsa_public_key_path: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_cipher_suite() -> String {
    CipherSuite::default().to_string()
}
fn default_rsa_private_key_path() -> String {
    DEFAULT_PRIVATE_KEY_PATH.into()
}
fn default_rsa_public_key_path() -> String {
    DEFAULT_PUBLIC_KEY_PATH.into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        self.suite()?;
        if let Some(key) = &self.envelope_key {
            ensure_non_empty(key, "ENVELOPE_KEY")?;
        }
        ensure_non_empty(&self.rsa_private_key_path, "RSA_PRIVATE_KEY_PATH")?;
        ensure_non_empty(&self.rsa_public_key_path, "RSA_PUBLIC_KEY_PATH")?;
        ensure_non_empty(&self.log_level, "LOG_LEVEL")?;
        Ok(())
    }

    /// The configured cipher suite.
    ///
    /// # Errors
    ///
    /// Returns an error if `CIPHER_SUITE` names an unsupported suite.
    pub fn suite(&self) -> Result<CipherSuite> {
        self.cipher_suite
            .parse()
            .context("CIPHER_SUITE must be AES-128-CBC or AES-256-CBC")
    }

    /// Build the envelope cipher from `ENVELOPE_KEY` and `CIPHER_SUITE`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Unavailable`] if the key is missing or does not
    /// fit the suite.
    pub fn cipher(&self) -> Result<EnvelopeCipher, ServiceError> {
        let key = self
            .envelope_key
            .as_deref()
            .ok_or_else(|| ServiceError::Unavailable("ENVELOPE_KEY is not set".into()))?;
        let suite = self
            .suite()
            .map_err(|e| ServiceError::Unavailable(format!("{e:#}")))?;
        Ok(EnvelopeCipher::new(key, suite)?)
    }

    /// Load the RSA private key from `RSA_PRIVATE_KEY_PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Unavailable`] if the file cannot be read or parsed.
    pub fn rsa_private(&self) -> Result<RsaService, ServiceError> {
        Ok(RsaService::from_private_key_file(&self.rsa_private_key_path)?)
    }

    /// Load the RSA public key from `RSA_PUBLIC_KEY_PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Unavailable`] if the file cannot be read or parsed.
    pub fn rsa_public(&self) -> Result<RsaService, ServiceError> {
        Ok(RsaService::from_public_key_file(&self.rsa_public_key_path)?)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("envelope_key", &self.envelope_key.as_ref().map(|_| "[REDACTED]"))
            .field("cipher_suite", &self.cipher_suite)
            .field("rsa_private_key_path", &self.rsa_private_key_path)
            .field("rsa_public_key_path", &self.rsa_public_key_path)
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} must not be empty");
    }
    Ok(())
}
