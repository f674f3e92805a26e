//! RSA encryption with PKCS#1 v1.5 padding and base64 framing.
//!
//! Keys are loaded from PEM files; this module never generates keys.
//! Every operation is a single RSA block, so payloads are limited to
//! [`RsaService::max_payload_len`] bytes.

pub mod service;

pub use service::{RsaError, RsaService, DEFAULT_PRIVATE_KEY_PATH, DEFAULT_PUBLIC_KEY_PATH};
