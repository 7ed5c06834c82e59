//! The condition table and its evaluator.
//!
//! Evaluation algorithm:
//!
//! 1. Collect every `ConditionConfig` matching (resource, role, action).
//!    Zero matches means no additional restriction — allow.
//! 2. Require the resource data to be a JSON object; anything else fails
//!    closed with the fixed "invalid resource data" reason.
//! 3. Walk each matching config's rules in declaration order. Resolve the
//!    rule value (placeholder substitution), apply the operator against the
//!    record's field, and abort on the first failing rule with that rule's
//!    description. Only the first violation is ever reported.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use lattice_contracts::{
    error::{AuthzError, AuthzResult},
    principal::{Role, UserId},
    request::CheckOutcome,
    resource::{Action, Resource},
    rule::{ConditionConfig, ConditionRule, Operator},
};
use lattice_core::traits::ConditionGate;

use crate::ops;

/// Fixed denial reason used when the condition layer needs resource data and
/// the caller supplied none (or supplied a non-object).
pub const INVALID_RESOURCE_DATA: &str = "invalid resource data";

/// The top-level structure deserialized from a TOML condition file.
///
/// ```toml
/// [[conditions]]
/// resource = "proposals"
/// role = "rep"
/// action = "update"
///
/// [[conditions.rules]]
/// kind = "status"
/// field = "status"
/// operator = "in"
/// value = ["DRAFT", "PENDING_REVIEW"]
/// description = "proposals may only be updated while in draft or pending review"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionTableConfig {
    pub conditions: Vec<ConditionConfig>,
}

/// The loaded, validated condition table.
#[derive(Debug, Clone)]
pub struct ConditionSet {
    configs: Vec<ConditionConfig>,
}

impl ConditionSet {
    /// Build a set from explicit configs.
    ///
    /// Validates every rule value at load time: unknown `{{…}}` placeholders
    /// and non-array values on `in`/`not-in` are configuration errors here,
    /// never per-request surprises.
    pub fn new(configs: Vec<ConditionConfig>) -> AuthzResult<Self> {
        for config in &configs {
            for rule in &config.rules {
                ops::validate_placeholders(&rule.value)?;
                if matches!(rule.operator, Operator::In | Operator::NotIn)
                    && !rule.value.is_array()
                {
                    return Err(AuthzError::ConfigError {
                        reason: format!(
                            "rule on field '{}' uses operator '{}' but its value is not an array",
                            rule.field, rule.operator
                        ),
                    });
                }
            }
        }
        debug!(configs = configs.len(), "condition table built");
        Ok(Self { configs })
    }

    /// Parse `s` as TOML and build a condition set.
    pub fn from_toml_str(s: &str) -> AuthzResult<Self> {
        let config: ConditionTableConfig =
            toml::from_str(s).map_err(|e| AuthzError::ConfigError {
                reason: format!("failed to parse condition TOML: {}", e),
            })?;
        Self::new(config.conditions)
    }

    /// Read the file at `path` and parse it as TOML condition configuration.
    pub fn from_file(path: &Path) -> AuthzResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AuthzError::ConfigError {
            reason: format!("failed to read condition file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Generated denial reason for a rule with no description.
    fn fallback_reason(rule: &ConditionRule) -> String {
        format!(
            "condition failed: field '{}' {} {}",
            rule.field, rule.operator, rule.value
        )
    }
}

impl ConditionGate for ConditionSet {
    fn evaluate(
        &self,
        role: Role,
        resource: Resource,
        action: Action,
        data: Option<&serde_json::Value>,
        user_id: &UserId,
    ) -> CheckOutcome {
        let matching: Vec<&ConditionConfig> = self
            .configs
            .iter()
            .filter(|c| c.matches(role, resource, action))
            .collect();

        // No matching config: no additional restriction.
        if matching.is_empty() {
            return CheckOutcome::allow();
        }

        let record = match data.and_then(|v| v.as_object()) {
            Some(map) => map,
            None => {
                warn!(
                    %role, %resource, %action,
                    "condition evaluation requires resource data, none supplied"
                );
                return CheckOutcome::deny(INVALID_RESOURCE_DATA);
            }
        };

        for config in matching {
            for rule in &config.rules {
                let expected = ops::resolve_value(&rule.value, user_id);
                let actual = record.get(&rule.field);
                if !ops::apply_operator(rule.operator, actual, &expected) {
                    let reason = rule
                        .description
                        .clone()
                        .unwrap_or_else(|| Self::fallback_reason(rule));
                    debug!(
                        %role, %resource, %action,
                        field = %rule.field,
                        operator = %rule.operator,
                        "condition rule violated"
                    );
                    return CheckOutcome::deny(reason);
                }
            }
        }

        CheckOutcome::allow()
    }
}
