//! Common types, JSON output documents, and errors shared across `envelope-svc` crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
