//! Common error types shared across crates.

use thiserror::Error;

/// Top-level error type reported by the command-line front end.
///
/// Variants map to process exit codes (sysexits.h):
/// - [`ServiceError::BadRequest`] → 65 (`EX_DATAERR`)
/// - [`ServiceError::Rejected`] → 65 (`EX_DATAERR`)
/// - [`ServiceError::Unavailable`] → 78 (`EX_CONFIG`)
/// - [`ServiceError::Internal`] → 70 (`EX_SOFTWARE`)
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The input was malformed: not base64, not JSON, or an incomplete envelope.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The input was well-formed but failed authentication or decryption.
    #[error("rejected: {0}")]
    Rejected(String),

    /// A key or other required configuration is missing or unusable.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the process exit code that should be used for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ServiceError::BadRequest(_) => 65,
            ServiceError::Rejected(_) => 65,
            ServiceError::Unavailable(_) => 78,
            ServiceError::Internal(_) => 70,
        }
    }

    /// Short machine-readable code used in JSON error output.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::Rejected(_) => "rejected",
            ServiceError::Unavailable(_) => "unavailable",
            ServiceError::Internal(_) => "internal",
        }
    }
}
