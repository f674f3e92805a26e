//! JSON documents written by the command-line front end.
//!
//! Suites are carried as their canonical names (`"AES-128-CBC"`) so that
//! this crate does not depend on the cipher crate.

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

// ---------------------------------------------------------------------------
// Key generation
// ---------------------------------------------------------------------------

/// Output of `envelope keygen --json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyResponse {
    /// Canonical suite name the key was generated for.
    pub suite: String,
    /// Base64-encoded key.
    pub key: String,
}

// ---------------------------------------------------------------------------
// RBAC seeding
// ---------------------------------------------------------------------------

/// One item of a seeded role/permission graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemView {
    /// Item name.
    pub name: String,
    /// `"role"` or `"permission"`.
    pub kind: String,
    /// Optional human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Names of the direct children.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

/// One role assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentView {
    /// Role name.
    pub role: String,
    /// User identifier.
    pub user_id: u64,
}

/// Output of `envelope seed-rbac`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RbacSnapshot {
    /// All roles and permissions.
    pub items: Vec<ItemView>,
    /// All role assignments.
    pub assignments: Vec<AssignmentView>,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Error document written to stderr when a command fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&ServiceError> for ErrorResponse {
    fn from(err: &ServiceError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}
