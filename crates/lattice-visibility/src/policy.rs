//! The field sensitivity table and projection filter.
//!
//! A `FieldPolicy` is keyed by (resource, field). Fields without an entry
//! are unrestricted. Filtering is a pure projection: it builds a new map
//! containing only the input keys the role may see — never adds fields,
//! never mutates the input, and maps null/non-object input to an empty
//! result instead of erroring.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use lattice_contracts::{
    error::{AuthzError, AuthzResult},
    principal::Role,
    resource::Resource,
    sensitivity::{FieldRule, Sensitivity},
};
use lattice_core::traits::FieldFilter;

/// The top-level structure deserialized from a TOML sensitivity file.
///
/// ```toml
/// [[fields]]
/// resource = "customers"
/// field = "creditScore"
/// sensitivity = "restricted"
/// allowed_roles = ["admin"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldTableConfig {
    pub fields: Vec<FieldRule>,
}

/// The loaded sensitivity table.
#[derive(Debug, Clone, Default)]
pub struct FieldPolicy {
    rules: HashMap<(Resource, String), FieldRule>,
}

impl FieldPolicy {
    /// Build a policy from explicit field rules. A duplicate (resource,
    /// field) pair is a configuration error — silently keeping one of two
    /// conflicting sensitivity entries would be a leak waiting to happen.
    pub fn new(entries: Vec<FieldRule>) -> AuthzResult<Self> {
        let mut rules = HashMap::new();
        for rule in entries {
            let key = (rule.resource, rule.field.clone());
            if rules.contains_key(&key) {
                return Err(AuthzError::ConfigError {
                    reason: format!(
                        "duplicate sensitivity entry for field '{}' of resource '{}'",
                        rule.field, rule.resource
                    ),
                });
            }
            rules.insert(key, rule);
        }
        debug!(fields = rules.len(), "field sensitivity table built");
        Ok(Self { rules })
    }

    /// Parse `s` as TOML and build a field policy.
    pub fn from_toml_str(s: &str) -> AuthzResult<Self> {
        let config: FieldTableConfig = toml::from_str(s).map_err(|e| AuthzError::ConfigError {
            reason: format!("failed to parse sensitivity TOML: {}", e),
        })?;
        Self::new(config.fields)
    }

    /// Read the file at `path` and parse it as TOML sensitivity configuration.
    pub fn from_file(path: &Path) -> AuthzResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AuthzError::ConfigError {
            reason: format!(
                "failed to read sensitivity file '{}': {}",
                path.display(),
                e
            ),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The configured fields of `resource` that `role` may see, sorted.
    pub fn accessible_fields(&self, role: Role, resource: Resource) -> Vec<String> {
        let mut out: Vec<String> = self
            .rules
            .iter()
            .filter(|((r, _), rule)| *r == resource && rule.allowed_roles.contains(&role))
            .map(|((_, field), _)| field.clone())
            .collect();
        out.sort();
        out
    }

    /// The configured fields of `resource` that `role` may NOT see, sorted.
    pub fn restricted_fields(&self, role: Role, resource: Resource) -> Vec<String> {
        let mut out: Vec<String> = self
            .rules
            .iter()
            .filter(|((r, _), rule)| *r == resource && !rule.allowed_roles.contains(&role))
            .map(|((_, field), _)| field.clone())
            .collect();
        out.sort();
        out
    }

    /// The sensitivity of one field; `Public` when unconfigured.
    pub fn sensitivity_of(&self, resource: Resource, field: &str) -> Sensitivity {
        self.rules
            .get(&(resource, field.to_string()))
            .map(|rule| rule.sensitivity)
            .unwrap_or(Sensitivity::Public)
    }
}

impl FieldFilter for FieldPolicy {
    fn can_access_field(&self, role: Role, resource: Resource, field: &str) -> bool {
        match self.rules.get(&(resource, field.to_string())) {
            None => true,
            Some(rule) => rule.allowed_roles.contains(&role),
        }
    }

    fn filter_record(
        &self,
        role: Role,
        resource: Resource,
        record: &serde_json::Value,
    ) -> serde_json::Value {
        match record.as_object() {
            Some(map) => serde_json::Value::Object(
                map.iter()
                    .filter(|(field, _)| self.can_access_field(role, resource, field))
                    .map(|(field, value)| (field.clone(), value.clone()))
                    .collect(),
            ),
            None => serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    fn filter_batch(
        &self,
        role: Role,
        resource: Resource,
        records: &[serde_json::Value],
    ) -> Vec<serde_json::Value> {
        records
            .iter()
            .map(|record| self.filter_record(role, resource, record))
            .collect()
    }
}
