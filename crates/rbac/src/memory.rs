//! [`MemoryAuthManager`]: in-process authorization store.

use std::collections::{BTreeMap, BTreeSet};

use common::protocol::{AssignmentView, ItemView, RbacSnapshot};
use tracing::debug;

use crate::item::{Item, ItemKind};
use crate::manager::{AuthManager, RbacError};

/// Authorization store kept entirely in memory. Nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuthManager {
    items: BTreeMap<String, Item>,
    children: BTreeMap<String, BTreeSet<String>>,
    assignments: BTreeMap<u64, BTreeSet<String>>,
}

impl MemoryAuthManager {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an item by name.
    pub fn item(&self, name: &str) -> Option<&Item> {
        self.items.get(name)
    }

    /// Direct children of `name`, in name order.
    pub fn children_of(&self, name: &str) -> Vec<&str> {
        self.children
            .get(name)
            .map(|c| c.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Roles directly assigned to `user_id`, in name order.
    pub fn roles_of(&self, user_id: u64) -> Vec<&str> {
        self.assignments
            .get(&user_id)
            .map(|r| r.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Render the whole store as a serialisable document.
    pub fn snapshot(&self) -> RbacSnapshot {
        let items = self
            .items
            .values()
            .map(|item| ItemView {
                name: item.name.clone(),
                kind: item.kind.to_string(),
                description: item.description.clone(),
                children: self
                    .children_of(&item.name)
                    .into_iter()
                    .map(str::to_owned)
                    .collect(),
            })
            .collect();
        let assignments = self
            .assignments
            .iter()
            .flat_map(|(user_id, roles)| {
                roles.iter().map(move |role| AssignmentView {
                    role: role.clone(),
                    user_id: *user_id,
                })
            })
            .collect();
        RbacSnapshot { items, assignments }
    }

    fn require(&self, name: &str) -> Result<&Item, RbacError> {
        self.items
            .get(name)
            .ok_or_else(|| RbacError::NotFound(name.to_owned()))
    }

    /// Returns `true` if `to` is `from` or a descendant of it.
    fn reaches(&self, from: &str, to: &str) -> bool {
        let mut stack = vec![from];
        let mut seen = BTreeSet::new();
        while let Some(name) = stack.pop() {
            if name == to {
                return true;
            }
            if !seen.insert(name) {
                continue;
            }
            if let Some(children) = self.children.get(name) {
                stack.extend(children.iter().map(String::as_str));
            }
        }
        false
    }
}

impl AuthManager for MemoryAuthManager {
    fn add(&mut self, item: Item) -> Result<(), RbacError> {
        if self.items.contains_key(&item.name) {
            return Err(RbacError::Duplicate(item.name));
        }
        debug!(name = %item.name, kind = %item.kind, "authorization item added");
        self.items.insert(item.name.clone(), item);
        Ok(())
    }

    fn add_child(&mut self, parent: &str, child: &str) -> Result<(), RbacError> {
        let parent_kind = self.require(parent)?.kind;
        let child_kind = self.require(child)?.kind;

        if parent_kind == ItemKind::Permission && child_kind == ItemKind::Role {
            return Err(RbacError::InvalidChild {
                parent: parent.to_owned(),
                child: child.to_owned(),
                kind: child_kind,
            });
        }
        if self.reaches(child, parent) {
            return Err(RbacError::Cycle {
                parent: parent.to_owned(),
                child: child.to_owned(),
            });
        }

        let inserted = self
            .children
            .entry(parent.to_owned())
            .or_default()
            .insert(child.to_owned());
        if !inserted {
            return Err(RbacError::Duplicate(format!("{parent} -> {child}")));
        }
        debug!(parent, child, "authorization child added");
        Ok(())
    }

    fn assign(&mut self, role: &str, user_id: u64) -> Result<(), RbacError> {
        if self.require(role)?.kind != ItemKind::Role {
            return Err(RbacError::NotARole(role.to_owned()));
        }
        let inserted = self
            .assignments
            .entry(user_id)
            .or_default()
            .insert(role.to_owned());
        if !inserted {
            return Err(RbacError::AlreadyAssigned {
                role: role.to_owned(),
                user_id,
            });
        }
        debug!(role, user_id, "role assigned");
        Ok(())
    }

    fn remove_all(&mut self) {
        self.items.clear();
        self.children.clear();
        self.assignments.clear();
    }

    fn check_access(&self, user_id: u64, name: &str) -> bool {
        self.assignments
            .get(&user_id)
            .is_some_and(|roles| roles.iter().any(|role| self.reaches(role, name)))
    }
}
