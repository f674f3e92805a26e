//! HMAC-SHA256 envelope signatures.
//!
//! The tag covers the base64 IV text immediately followed by the base64
//! ciphertext text, exactly as they appear in the envelope record, and is
//! rendered as lowercase hex.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Keyed signer bound to one cipher key.
#[derive(Clone)]
pub struct Signer {
    mac: HmacSha256,
}

impl Signer {
    /// Build a signer keyed with `key`.
    ///
    /// HMAC accepts keys of any length, so this only fails if the underlying
    /// primitive rejects the key outright.
    pub fn new(key: &[u8]) -> Result<Self, hmac::digest::InvalidLength> {
        Ok(Self {
            mac: HmacSha256::new_from_slice(key)?,
        })
    }

    /// Compute the hex tag over `iv` and `value`.
    pub fn hash(&self, iv: &str, value: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(iv.as_bytes());
        mac.update(value.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Recompute the tag and compare it with `sign` in constant time.
    pub fn verify(&self, iv: &str, value: &str, sign: &str) -> bool {
        let expected = self.hash(iv, value);
        expected.as_bytes().ct_eq(sign.as_bytes()).into()
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Signer([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc4231_case_2() {
        // "Jefe" / "what do ya want for nothing?", split across iv and value.
        let signer = Signer::new(b"Jefe").unwrap();
        assert_eq!(
            signer.hash("what do ya want ", "for nothing?"),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn tag_covers_concatenation_only() {
        let signer = Signer::new(&[7u8; 16]).unwrap();
        assert_eq!(signer.hash("ab", "cd"), signer.hash("a", "bcd"));
        assert_ne!(signer.hash("ab", "cd"), signer.hash("ab", "ce"));
    }

    #[test]
    fn verify_accepts_own_tag() {
        let signer = Signer::new(&[1u8; 32]).unwrap();
        let tag = signer.hash("iv", "value");
        assert_eq!(tag.len(), 64);
        assert!(signer.verify("iv", "value", &tag));
    }

    #[test]
    fn verify_rejects_modified_tag() {
        let signer = Signer::new(&[1u8; 32]).unwrap();
        let mut tag = signer.hash("iv", "value").into_bytes();
        tag[10] = if tag[10] == b'0' { b'1' } else { b'0' };
        let tag = String::from_utf8(tag).unwrap();
        assert!(!signer.verify("iv", "value", &tag));
    }

    #[test]
    fn verify_rejects_truncated_and_uppercase_tags() {
        let signer = Signer::new(&[1u8; 32]).unwrap();
        let tag = signer.hash("iv", "value");
        assert!(!signer.verify("iv", "value", &tag[..63]));
        assert!(!signer.verify("iv", "value", ""));
        if tag.chars().any(|c| c.is_ascii_alphabetic()) {
            assert!(!signer.verify("iv", "value", &tag.to_uppercase()));
        }
    }

    #[test]
    fn different_keys_give_different_tags() {
        let a = Signer::new(&[1u8; 16]).unwrap();
        let b = Signer::new(&[2u8; 16]).unwrap();
        assert_ne!(a.hash("iv", "value"), b.hash("iv", "value"));
    }
}
