//! Authorization items: roles and permissions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether an item is a role or a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Assignable to users; may contain roles and permissions.
    Role,
    /// Leaf-level right; may contain only permissions.
    Permission,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Role => f.write_str("role"),
            ItemKind::Permission => f.write_str("permission"),
        }
    }
}

/// A named role or permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique name across roles and permissions.
    pub name: String,
    /// Role or permission.
    pub kind: ItemKind,
    /// Optional human-readable description.
    pub description: Option<String>,
}

impl Item {
    /// A role with no description.
    pub fn role(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ItemKind::Role,
            description: None,
        }
    }

    /// A permission with no description.
    pub fn permission(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ItemKind::Permission,
            description: None,
        }
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
