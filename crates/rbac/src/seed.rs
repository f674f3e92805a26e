//! Default role/permission graph.
//!
//! ```text
//! admin ──┬── updatePost
//!         └── author ── createPost
//! ```
//!
//! `author` is assigned to user 2 and `admin` to user 1.

use tracing::info;

use crate::item::Item;
use crate::manager::{AuthManager, RbacError};

/// Permission to create posts.
pub const CREATE_POST: &str = "createPost";
/// Permission to update posts.
pub const UPDATE_POST: &str = "updatePost";
/// Role holding [`CREATE_POST`].
pub const AUTHOR: &str = "author";
/// Role holding [`UPDATE_POST`] and everything [`AUTHOR`] holds.
pub const ADMIN: &str = "admin";

/// User seeded with the [`AUTHOR`] role.
pub const AUTHOR_USER_ID: u64 = 2;
/// User seeded with the [`ADMIN`] role.
pub const ADMIN_USER_ID: u64 = 1;

/// Write the default graph into `auth`.
///
/// The store is not cleared first; seeding a store that already holds any of
/// these items fails with [`RbacError::Duplicate`].
///
/// # Errors
///
/// Returns the first error reported by the store.
pub fn seed<M: AuthManager + ?Sized>(auth: &mut M) -> Result<(), RbacError> {
    auth.add(Item::permission(CREATE_POST).with_description("Create a post"))?;
    auth.add(Item::permission(UPDATE_POST).with_description("Update post"))?;

    auth.add(Item::role(AUTHOR))?;
    auth.add_child(AUTHOR, CREATE_POST)?;

    auth.add(Item::role(ADMIN))?;
    auth.add_child(ADMIN, UPDATE_POST)?;
    auth.add_child(ADMIN, AUTHOR)?;

    auth.assign(AUTHOR, AUTHOR_USER_ID)?;
    auth.assign(ADMIN, ADMIN_USER_ID)?;

    info!("default roles and permissions seeded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemKind;
    use crate::manager::MockAuthManager;
    use crate::memory::MemoryAuthManager;
    use mockall::{predicate::eq, Sequence};

    #[test]
    fn seeds_expected_graph() {
        let mut m = MemoryAuthManager::new();
        seed(&mut m).unwrap();

        assert_eq!(
            m.item(CREATE_POST).unwrap().description.as_deref(),
            Some("Create a post")
        );
        assert_eq!(m.item(ADMIN).unwrap().kind, ItemKind::Role);
        assert_eq!(m.children_of(ADMIN), vec![AUTHOR, UPDATE_POST]);
        assert_eq!(m.children_of(AUTHOR), vec![CREATE_POST]);
        assert_eq!(m.roles_of(ADMIN_USER_ID), vec![ADMIN]);
        assert_eq!(m.roles_of(AUTHOR_USER_ID), vec![AUTHOR]);
    }

    #[test]
    fn seeded_access_rules() {
        let mut m = MemoryAuthManager::new();
        seed(&mut m).unwrap();

        assert!(m.check_access(ADMIN_USER_ID, UPDATE_POST));
        assert!(m.check_access(ADMIN_USER_ID, CREATE_POST));
        assert!(m.check_access(AUTHOR_USER_ID, CREATE_POST));
        assert!(!m.check_access(AUTHOR_USER_ID, UPDATE_POST));
    }

    #[test]
    fn seeding_twice_fails_with_duplicate() {
        let mut m = MemoryAuthManager::new();
        seed(&mut m).unwrap();
        assert_eq!(
            seed(&mut m),
            Err(RbacError::Duplicate(CREATE_POST.into()))
        );
    }

    #[test]
    fn seeding_after_remove_all_succeeds() {
        let mut m = MemoryAuthManager::new();
        seed(&mut m).unwrap();
        m.remove_all();
        assert!(seed(&mut m).is_ok());
    }

    #[test]
    fn calls_store_in_order() {
        let mut mock = MockAuthManager::new();
        let mut seq = Sequence::new();

        mock.expect_add()
            .withf(|item| item.name == CREATE_POST && item.kind == ItemKind::Permission)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_add()
            .withf(|item| item.name == UPDATE_POST)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_add()
            .withf(|item| item.name == AUTHOR && item.kind == ItemKind::Role)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_add_child()
            .with(eq(AUTHOR), eq(CREATE_POST))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        mock.expect_add()
            .withf(|item| item.name == ADMIN)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_add_child()
            .with(eq(ADMIN), eq(UPDATE_POST))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        mock.expect_add_child()
            .with(eq(ADMIN), eq(AUTHOR))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        mock.expect_assign()
            .with(eq(AUTHOR), eq(AUTHOR_USER_ID))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        mock.expect_assign()
            .with(eq(ADMIN), eq(ADMIN_USER_ID))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        mock.expect_remove_all().never();

        seed(&mut mock).unwrap();
    }

    #[test]
    fn stops_at_first_store_error() {
        let mut mock = MockAuthManager::new();
        mock.expect_add()
            .times(1)
            .returning(|item| Err(RbacError::Duplicate(item.name)));
        mock.expect_add_child().never();
        mock.expect_assign().never();

        assert_eq!(
            seed(&mut mock),
            Err(RbacError::Duplicate(CREATE_POST.into()))
        );
    }
}
