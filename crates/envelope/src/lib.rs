//! `envelope`: authenticated symmetric envelopes and an RSA wrapper.
//!
//! - [`crypto`]: AES-CBC + HMAC-SHA256 envelopes ([`EnvelopeCipher`]).
//! - [`asymmetric`]: PKCS#1 v1.5 RSA operations with base64 framing ([`RsaService`]).
//!
//! Nothing here performs I/O except loading RSA key files, and nothing here
//! terminates the process: every failure is returned as a typed error.

pub mod asymmetric;
pub mod crypto;
mod error;

pub use asymmetric::{RsaError, RsaService};
pub use crypto::{CipherError, CipherSuite, Envelope, EnvelopeCipher};
