//! The static role→resource→action permission matrix.
//!
//! One `PolicyMatrix` is built at startup from explicit grants (in code or
//! from TOML) and never changes. Lookup is O(1) by (role, resource);
//! everything is fail-closed — a pair with no grant permits nothing.
//!
//! `Action::Manage` is the wildcard: a grant containing it permits every
//! action for that pair.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use lattice_contracts::{
    error::{AuthzError, AuthzResult},
    principal::Role,
    resource::{Action, Resource},
};
use lattice_core::traits::RoleMatrix;

/// One (role, resource) grant: the set of actions the role holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub role: Role,
    pub resource: Resource,
    pub actions: HashSet<Action>,
}

/// The top-level structure deserialized from a TOML permission file.
///
/// ```toml
/// [[grants]]
/// role = "rep"
/// resource = "customers"
/// actions = ["create", "read", "update", "list"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixConfig {
    pub grants: Vec<PermissionGrant>,
}

/// The coarse permission table.
///
/// Duplicate grants for the same (role, resource) pair are unioned.
#[derive(Debug, Clone)]
pub struct PolicyMatrix {
    grants: HashMap<(Role, Resource), HashSet<Action>>,
}

impl PolicyMatrix {
    /// Build a matrix from explicit grants.
    ///
    /// Returns `AuthzError::ConfigError` if any grant carries an empty action
    /// set — an empty grant is always a configuration mistake, since absence
    /// already means "no access".
    pub fn new(entries: Vec<PermissionGrant>) -> AuthzResult<Self> {
        let mut grants: HashMap<(Role, Resource), HashSet<Action>> = HashMap::new();
        for entry in entries {
            if entry.actions.is_empty() {
                return Err(AuthzError::ConfigError {
                    reason: format!(
                        "grant for role '{}' on resource '{}' has an empty action set",
                        entry.role, entry.resource
                    ),
                });
            }
            grants
                .entry((entry.role, entry.resource))
                .or_default()
                .extend(entry.actions);
        }
        debug!(pairs = grants.len(), "permission matrix built");
        Ok(Self { grants })
    }

    /// Parse `s` as TOML and build a matrix.
    pub fn from_toml_str(s: &str) -> AuthzResult<Self> {
        let config: MatrixConfig = toml::from_str(s).map_err(|e| AuthzError::ConfigError {
            reason: format!("failed to parse permission TOML: {}", e),
        })?;
        Self::new(config.grants)
    }

    /// Read the file at `path` and parse it as TOML permission configuration.
    pub fn from_file(path: &Path) -> AuthzResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AuthzError::ConfigError {
            reason: format!("failed to read permission file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Return true if `role` may perform any of `actions` on `resource`.
    pub fn allows_any(&self, role: Role, resource: Resource, actions: &[Action]) -> bool {
        actions.iter().any(|&a| self.allows(role, resource, a))
    }

    /// Return true if `role` may perform all of `actions` on `resource`.
    pub fn allows_all(&self, role: Role, resource: Resource, actions: &[Action]) -> bool {
        actions.iter().all(|&a| self.allows(role, resource, a))
    }

    /// The actions `role` holds on `resource`, sorted for determinism.
    ///
    /// A `Manage` grant expands to every action.
    pub fn actions_for(&self, role: Role, resource: Resource) -> Vec<Action> {
        match self.grants.get(&(role, resource)) {
            None => vec![],
            Some(actions) if actions.contains(&Action::Manage) => Action::ALL.to_vec(),
            Some(actions) => {
                let mut out: Vec<Action> = actions.iter().copied().collect();
                out.sort();
                out
            }
        }
    }

    /// Every grant held by `role`, ordered by resource declaration order.
    pub fn grants_for(&self, role: Role) -> Vec<PermissionGrant> {
        Resource::ALL
            .into_iter()
            .filter_map(|resource| {
                self.grants.get(&(role, resource)).map(|actions| PermissionGrant {
                    role,
                    resource,
                    actions: actions.clone(),
                })
            })
            .collect()
    }
}

impl RoleMatrix for PolicyMatrix {
    /// Fail-closed lookup with the `Manage` wildcard.
    fn allows(&self, role: Role, resource: Resource, action: Action) -> bool {
        match self.grants.get(&(role, resource)) {
            None => false,
            Some(actions) => actions.contains(&Action::Manage) || actions.contains(&action),
        }
    }
}
