//! The restriction engine.
//!
//! `Limiter` holds the loaded restriction table plus an injected
//! `CounterStore` and implements the `ActionLimiter` trait. All restrictions
//! across all configs matching a request's (resource, role, action) triple
//! must pass; the first failure short-circuits with its reason. An absent
//! config means no restriction — allow.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use lattice_conditions::ops;
use lattice_conditions::INVALID_RESOURCE_DATA;
use lattice_contracts::{
    error::{AuthzError, AuthzResult},
    request::{AccessRequest, CheckOutcome},
    restriction::{CounterKey, CounterKind, CounterVerdict, Restriction, RestrictionConfig},
};
use lattice_core::traits::{ActionLimiter, CounterStore};

/// The top-level structure deserialized from a TOML restriction file.
///
/// ```toml
/// [[restrictions]]
/// resource = "customers"
/// role = "rep"
/// action = "create"
///
/// [[restrictions.limits]]
/// kind = "rate-limit"
/// limit = 20
/// window = "1h"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestrictionTableConfig {
    pub restrictions: Vec<RestrictionConfig>,
}

/// The restriction engine: a validated table plus its counter store.
pub struct Limiter {
    configs: Vec<RestrictionConfig>,
    store: Box<dyn CounterStore>,
}

impl Limiter {
    /// Build a limiter from explicit configs and a counter store.
    ///
    /// Validates at load time: rate/quota limits must be positive, and
    /// precondition rule values may not carry unknown placeholders.
    pub fn new(configs: Vec<RestrictionConfig>, store: Box<dyn CounterStore>) -> AuthzResult<Self> {
        for config in &configs {
            for restriction in &config.limits {
                match restriction {
                    Restriction::RateLimit { limit, .. } | Restriction::Quota { limit, .. } => {
                        if *limit == 0 {
                            return Err(AuthzError::ConfigError {
                                reason: format!(
                                    "zero limit for role '{}' on resource '{}': use a missing \
                                     grant to deny outright",
                                    config.role, config.resource
                                ),
                            });
                        }
                    }
                    Restriction::Precondition {
                        require_rules: Some(rules),
                        ..
                    } => {
                        for rule in rules {
                            ops::validate_placeholders(&rule.value)?;
                        }
                    }
                    _ => {}
                }
            }
        }
        debug!(configs = configs.len(), "restriction table built");
        Ok(Self { configs, store })
    }

    /// Parse `s` as TOML and build a limiter around `store`.
    pub fn from_toml_str(s: &str, store: Box<dyn CounterStore>) -> AuthzResult<Self> {
        let config: RestrictionTableConfig =
            toml::from_str(s).map_err(|e| AuthzError::ConfigError {
                reason: format!("failed to parse restriction TOML: {}", e),
            })?;
        Self::new(config.restrictions, store)
    }

    /// Read the file at `path` and parse it as TOML restriction configuration.
    pub fn from_file(path: &Path, store: Box<dyn CounterStore>) -> AuthzResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AuthzError::ConfigError {
            reason: format!(
                "failed to read restriction file '{}': {}",
                path.display(),
                e
            ),
        })?;
        Self::from_toml_str(&contents, store)
    }

    fn counter_key(req: &AccessRequest, kind: CounterKind) -> CounterKey {
        CounterKey {
            role: req.role,
            resource: req.resource,
            action: req.action,
            user_id: req.user_id.clone(),
            kind,
        }
    }

    /// A denial that still reports zero remaining admissions.
    fn exhausted(reason: String) -> CheckOutcome {
        CheckOutcome {
            allowed: false,
            reason: Some(reason),
            remaining: Some(0),
        }
    }
}

impl ActionLimiter for Limiter {
    fn check(&self, req: &AccessRequest, now: DateTime<Utc>) -> CheckOutcome {
        // Remaining admissions from the most recent counter consulted.
        let mut remaining: Option<u32> = None;

        for config in self
            .configs
            .iter()
            .filter(|c| c.matches(req.role, req.resource, req.action))
        {
            for restriction in &config.limits {
                match restriction {
                    Restriction::RateLimit { limit, window } => {
                        let key = Self::counter_key(req, CounterKind::Rate);
                        match self.store.hit(&key, *limit, window.duration(), now) {
                            CounterVerdict::Admitted { remaining: left } => {
                                remaining = Some(left);
                            }
                            CounterVerdict::Exhausted { retry_after_secs } => {
                                warn!(
                                    user_id = %req.user_id,
                                    resource = %req.resource,
                                    action = %req.action,
                                    limit,
                                    "rate limit exceeded"
                                );
                                return Self::exhausted(format!(
                                    "rate limit exceeded: {} per {} reached, retry in {}s",
                                    limit, window, retry_after_secs
                                ));
                            }
                        }
                    }

                    Restriction::Quota { limit, period } => {
                        let key = Self::counter_key(req, CounterKind::Quota);
                        match self.store.hit(&key, *limit, period.duration(), now) {
                            CounterVerdict::Admitted { remaining: left } => {
                                remaining = Some(left);
                            }
                            CounterVerdict::Exhausted { retry_after_secs } => {
                                warn!(
                                    user_id = %req.user_id,
                                    resource = %req.resource,
                                    action = %req.action,
                                    limit,
                                    "quota exhausted"
                                );
                                return Self::exhausted(format!(
                                    "quota exhausted: {} per {} reached, resets in {}s",
                                    limit, period, retry_after_secs
                                ));
                            }
                        }
                    }

                    Restriction::FieldWrite {
                        allowed_fields,
                        restricted_fields,
                    } => {
                        // No update data: nothing to constrain.
                        let update = match req.update_data.as_ref().and_then(|v| v.as_object()) {
                            Some(map) => map,
                            None => continue,
                        };
                        if let Some(restricted) = restricted_fields {
                            if let Some(field) =
                                update.keys().find(|f| restricted.contains(f))
                            {
                                return CheckOutcome::deny(format!(
                                    "field '{}' cannot be modified",
                                    field
                                ));
                            }
                        }
                        if let Some(allowed) = allowed_fields {
                            if let Some(field) = update.keys().find(|f| !allowed.contains(f)) {
                                return CheckOutcome::deny(format!(
                                    "field '{}' is not writable for this action",
                                    field
                                ));
                            }
                        }
                    }

                    Restriction::Precondition {
                        require_empty_fields,
                        require_rules,
                    } => {
                        // Preconditions need the resource's current data;
                        // fail closed without it, unlike FieldWrite.
                        let record = match req.resource_data.as_ref().and_then(|v| v.as_object()) {
                            Some(map) => map,
                            None => return CheckOutcome::deny(INVALID_RESOURCE_DATA),
                        };
                        if let Some(fields) = require_empty_fields {
                            for field in fields {
                                if !is_empty_value(record.get(field)) {
                                    return CheckOutcome::deny(format!(
                                        "field '{}' must be empty",
                                        field
                                    ));
                                }
                            }
                        }
                        if let Some(rules) = require_rules {
                            for rule in rules {
                                let expected = ops::resolve_value(&rule.value, &req.user_id);
                                if !ops::apply_operator(
                                    rule.operator,
                                    record.get(&rule.field),
                                    &expected,
                                ) {
                                    let reason = rule.message.clone().unwrap_or_else(|| {
                                        format!(
                                            "precondition failed: field '{}' {} {}",
                                            rule.field, rule.operator, rule.value
                                        )
                                    });
                                    return CheckOutcome::deny(reason);
                                }
                            }
                        }
                    }
                }
            }
        }

        CheckOutcome {
            allowed: true,
            reason: None,
            remaining,
        }
    }
}

/// Empty for precondition purposes: missing, null, "", or [].
fn is_empty_value(value: Option<&serde_json::Value>) -> bool {
    match value {
        None => true,
        Some(serde_json::Value::Null) => true,
        Some(serde_json::Value::String(s)) => s.is_empty(),
        Some(serde_json::Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}
