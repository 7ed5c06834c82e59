//! Ownership scoping.
//!
//! Decides whether a principal "owns" a resource instance for scoping
//! purposes. The reference policy: Admin and Manager own everything; every
//! other role owns exactly the instances whose owner id matches their own.
//! An instance with no owner id is ownerless/public and anyone may act on it.

use lattice_contracts::principal::{Role, UserId};

/// Resolves ownership for the pipeline's optional ownership stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnershipResolver;

impl OwnershipResolver {
    pub fn new() -> Self {
        Self
    }

    /// Return true if `acting` owns the instance whose owner is `owner`.
    ///
    /// - Admin and Manager: always true.
    /// - `owner == None`: ownerless/public, always true.
    /// - Otherwise: id equality.
    pub fn owns(&self, role: Role, acting: &UserId, owner: Option<&UserId>) -> bool {
        match role {
            Role::Admin | Role::Manager => true,
            _ => match owner {
                None => true,
                Some(owner_id) => acting == owner_id,
            },
        }
    }
}
