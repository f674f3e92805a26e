//! Role-based access control bootstrap.
//!
//! The authorization store itself is external and reached through the
//! [`AuthManager`] trait. [`seed`] writes the default role/permission graph
//! into any store; [`MemoryAuthManager`] is an in-process store with no
//! persistence.

pub mod item;
pub mod manager;
pub mod memory;
pub mod seed;

pub use item::{Item, ItemKind};
pub use manager::{AuthManager, RbacError};
pub use memory::MemoryAuthManager;
pub use seed::seed;
