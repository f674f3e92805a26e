//! [`AuthManager`]: the seam to an authorization store.

use thiserror::Error;

use crate::item::{Item, ItemKind};

/// Errors produced by an authorization store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RbacError {
    /// An item with this name already exists, or the edge already exists.
    #[error("authorization item already exists: {0}")]
    Duplicate(String),

    /// No item with this name exists.
    #[error("authorization item not found: {0}")]
    NotFound(String),

    /// Adding the edge would make an item its own descendant.
    #[error("cannot add {child} as a child of {parent}: a loop would be created")]
    Cycle {
        /// Parent item name.
        parent: String,
        /// Child item name.
        child: String,
    },

    /// A permission cannot contain a role.
    #[error("cannot add {kind} {child} as a child of permission {parent}")]
    InvalidChild {
        /// Parent item name.
        parent: String,
        /// Child item name.
        child: String,
        /// Kind of the child.
        kind: ItemKind,
    },

    /// Only roles can be assigned to users.
    #[error("{0} is not a role")]
    NotARole(String),

    /// The role is already assigned to the user.
    #[error("role {role} is already assigned to user {user_id}")]
    AlreadyAssigned {
        /// Role name.
        role: String,
        /// User identifier.
        user_id: u64,
    },
}

/// An authorization store holding roles, permissions, their hierarchy, and
/// user assignments.
#[cfg_attr(test, mockall::automock)]
pub trait AuthManager {
    /// Add a role or permission.
    ///
    /// # Errors
    ///
    /// Returns [`RbacError::Duplicate`] if the name is taken.
    fn add(&mut self, item: Item) -> Result<(), RbacError>;

    /// Make `child` a direct child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`RbacError::NotFound`], [`RbacError::InvalidChild`],
    /// [`RbacError::Cycle`] or [`RbacError::Duplicate`].
    fn add_child(&mut self, parent: &str, child: &str) -> Result<(), RbacError>;

    /// Assign `role` to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RbacError::NotFound`], [`RbacError::NotARole`] or
    /// [`RbacError::AlreadyAssigned`].
    fn assign(&mut self, role: &str, user_id: u64) -> Result<(), RbacError>;

    /// Remove every item, edge, and assignment.
    fn remove_all(&mut self);

    /// Returns `true` if `user_id` holds `name` directly or through the hierarchy.
    fn check_access(&self, user_id: u64, name: &str) -> bool;
}
