//! [`CipherSuite`]: the block cipher and mode an [`EnvelopeCipher`] is bound to.
//!
//! [`EnvelopeCipher`]: super::EnvelopeCipher

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// AES block size, which is also the CBC IV length for every suite.
pub const IV_LEN: usize = 16;

/// Supported cipher suites. Both run AES in CBC mode with PKCS#7 padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CipherSuite {
    /// AES-128-CBC, 16-byte key.
    #[default]
    #[serde(rename = "AES-128-CBC", alias = "aes-128-cbc")]
    Aes128Cbc,
    /// AES-256-CBC, 32-byte key.
    #[serde(rename = "AES-256-CBC", alias = "aes-256-cbc")]
    Aes256Cbc,
}

impl CipherSuite {
    /// Required key length in raw bytes.
    pub const fn key_len(self) -> usize {
        match self {
            CipherSuite::Aes128Cbc => 16,
            CipherSuite::Aes256Cbc => 32,
        }
    }

    /// Required IV length in raw bytes.
    pub const fn iv_len(self) -> usize {
        IV_LEN
    }

    /// Canonical name, e.g. `"AES-128-CBC"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            CipherSuite::Aes128Cbc => "AES-128-CBC",
            CipherSuite::Aes256Cbc => "AES-256-CBC",
        }
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a suite name is not recognised.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported cipher suite: {0}")]
pub struct UnknownSuite(pub String);

impl FromStr for CipherSuite {
    type Err = UnknownSuite;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AES-128-CBC" => Ok(CipherSuite::Aes128Cbc),
            "AES-256-CBC" => Ok(CipherSuite::Aes256Cbc),
            _ => Err(UnknownSuite(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lengths_per_suite() {
        assert_eq!(CipherSuite::Aes128Cbc.key_len(), 16);
        assert_eq!(CipherSuite::Aes256Cbc.key_len(), 32);
        assert_eq!(CipherSuite::Aes128Cbc.iv_len(), 16);
        assert_eq!(CipherSuite::Aes256Cbc.iv_len(), 16);
    }

    #[test]
    fn default_is_aes_128() {
        assert_eq!(CipherSuite::default(), CipherSuite::Aes128Cbc);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("aes-256-cbc".parse::<CipherSuite>(), Ok(CipherSuite::Aes256Cbc));
        assert_eq!(" AES-128-CBC ".parse::<CipherSuite>(), Ok(CipherSuite::Aes128Cbc));
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("AES-256-GCM".parse::<CipherSuite>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for suite in [CipherSuite::Aes128Cbc, CipherSuite::Aes256Cbc] {
            assert_eq!(suite.to_string().parse::<CipherSuite>(), Ok(suite));
        }
    }

    #[test]
    fn serde_uses_canonical_names() {
        let json = serde_json::to_string(&CipherSuite::Aes256Cbc).unwrap();
        assert_eq!(json, "\"AES-256-CBC\"");
        let parsed: CipherSuite = serde_json::from_str("\"aes-128-cbc\"").unwrap();
        assert_eq!(parsed, CipherSuite::Aes128Cbc);
    }
}
