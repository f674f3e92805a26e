//! AES-CBC + HMAC-SHA256 envelope encryption.
//!
//! This module is free of I/O. It turns values into opaque, signed strings
//! and back, and nothing else.
//!
//! # Envelope format
//!
//! ```text
//! base64( {"iv":"<base64 iv>","value":"<base64 ciphertext>","sign":"<hex hmac>"} )
//! ```
//!
//! `sign` is HMAC-SHA256 under the cipher key over the `iv` text followed by
//! the `value` text. It is checked in constant time before any decryption.

pub mod cipher;
pub mod envelope;
pub mod key;
pub mod sign;
pub mod suite;

pub use cipher::{CipherError, EnvelopeCipher};
pub use envelope::Envelope;
pub use key::{generate_key, KeyBytes};
pub use suite::{CipherSuite, UnknownSuite};
