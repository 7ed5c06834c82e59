//! # lattice-limits
//!
//! Action-level restrictions for the lattice authorization engine: rolling
//! rate limits, long-period quotas, writable-field restrictions, and
//! preconditions over the resource's current data.
//!
//! ## Overview
//!
//! This crate provides [`Limiter`], which implements the
//! [`ActionLimiter`](lattice_core::traits::ActionLimiter) trait, and
//! [`InMemoryCounterStore`], the reference
//! [`CounterStore`](lattice_core::traits::CounterStore) implementation.
//! The store is injected, so a shared backing store can replace the
//! in-process map without touching restriction logic.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use lattice_limits::{InMemoryCounterStore, Limiter};
//!
//! let limiter = Limiter::from_file(
//!     Path::new("policies/restrictions.toml"),
//!     Box::new(InMemoryCounterStore::new()),
//! )?;
//! ```

pub mod limiter;
pub mod store;

pub use limiter::{Limiter, RestrictionTableConfig};
pub use store::InMemoryCounterStore;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use serde_json::json;

    use lattice_conditions::INVALID_RESOURCE_DATA;
    use lattice_contracts::{
        principal::{Role, UserId},
        request::AccessRequest,
        resource::{Action, Resource},
        restriction::{
            Period, PreconditionRule, Restriction, RestrictionConfig, Window,
        },
        rule::Operator,
    };
    use lattice_core::traits::ActionLimiter;

    use crate::{InMemoryCounterStore, Limiter};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap()
    }

    fn request(role: Role, resource: Resource, action: Action, user: &str) -> AccessRequest {
        AccessRequest {
            role,
            resource,
            action,
            user_id: UserId::new(user),
            resource_data: None,
            update_data: None,
            ownership: None,
        }
    }

    fn limiter(configs: Vec<RestrictionConfig>) -> Limiter {
        Limiter::new(configs, Box::new(InMemoryCounterStore::new())).unwrap()
    }

    fn rate_config(limit: u32, window: &str) -> RestrictionConfig {
        RestrictionConfig {
            resource: Resource::Customers,
            role: Role::Rep,
            action: Action::Create,
            limits: vec![Restriction::RateLimit {
                limit,
                window: Window::try_from(window.to_string()).unwrap(),
            }],
        }
    }

    // ── Rate limits ──────────────────────────────────────────────────────────

    /// Limit 20 per hour: calls 1–20 admit with remaining 19..=0, call 21
    /// denies with remaining 0, and the window's end resets to 19.
    #[test]
    fn rate_limit_monotonicity_and_reset() {
        let l = limiter(vec![rate_config(20, "1h")]);
        let req = request(Role::Rep, Resource::Customers, Action::Create, "5");

        for expected in (0..20).rev() {
            let outcome = l.check(&req, t0());
            assert!(outcome.allowed);
            assert_eq!(outcome.remaining, Some(expected));
        }

        let denied = l.check(&req, t0() + Duration::minutes(59));
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, Some(0));
        let reason = denied.reason.unwrap();
        assert!(reason.contains("rate limit exceeded"), "reason: {}", reason);
        assert!(reason.contains("retry in 60s"), "reason: {}", reason);

        // One full window after the first call: fresh window.
        let reset = l.check(&req, t0() + Duration::hours(1));
        assert!(reset.allowed);
        assert_eq!(reset.remaining, Some(19));
    }

    #[test]
    fn rate_limit_counters_are_per_user() {
        let l = limiter(vec![rate_config(1, "1h")]);
        let first = request(Role::Rep, Resource::Customers, Action::Create, "5");
        let second = request(Role::Rep, Resource::Customers, Action::Create, "9");

        assert!(l.check(&first, t0()).allowed);
        assert!(!l.check(&first, t0()).allowed);
        // A different principal has an independent counter.
        assert!(l.check(&second, t0()).allowed);
    }

    #[test]
    fn unconfigured_triple_is_unrestricted() {
        let l = limiter(vec![rate_config(1, "1h")]);
        let req = request(Role::Manager, Resource::Customers, Action::Create, "5");
        for _ in 0..10 {
            let outcome = l.check(&req, t0());
            assert!(outcome.allowed);
            assert_eq!(outcome.remaining, None);
        }
    }

    // ── Quotas ───────────────────────────────────────────────────────────────

    /// A rate limit and a quota on the same triple keep independent counters.
    #[test]
    fn quota_and_rate_use_distinct_namespaces() {
        let l = limiter(vec![RestrictionConfig {
            resource: Resource::Opportunities,
            role: Role::Rep,
            action: Action::Export,
            limits: vec![
                Restriction::RateLimit {
                    limit: 5,
                    window: Window::try_from("1m".to_string()).unwrap(),
                },
                Restriction::Quota {
                    limit: 3,
                    period: Period::Day,
                },
            ],
        }]);
        let req = request(Role::Rep, Resource::Opportunities, Action::Export, "5");

        // Three exports pass both; the rate counter still has room but the
        // daily quota is spent.
        for _ in 0..3 {
            assert!(l.check(&req, t0()).allowed);
        }
        let denied = l.check(&req, t0());
        assert!(!denied.allowed);
        let reason = denied.reason.unwrap();
        assert!(reason.contains("quota exhausted"), "reason: {}", reason);
        assert!(reason.contains("per day"), "reason: {}", reason);
    }

    /// The last counter consulted supplies `remaining`.
    #[test]
    fn remaining_comes_from_last_counter() {
        let l = limiter(vec![RestrictionConfig {
            resource: Resource::Opportunities,
            role: Role::Rep,
            action: Action::Export,
            limits: vec![
                Restriction::RateLimit {
                    limit: 100,
                    window: Window::try_from("1h".to_string()).unwrap(),
                },
                Restriction::Quota {
                    limit: 10,
                    period: Period::Day,
                },
            ],
        }]);
        let req = request(Role::Rep, Resource::Opportunities, Action::Export, "5");
        let outcome = l.check(&req, t0());
        assert_eq!(outcome.remaining, Some(9));
    }

    // ── Field-write restrictions ─────────────────────────────────────────────

    fn field_write_config(
        allowed: Option<Vec<&str>>,
        restricted: Option<Vec<&str>>,
    ) -> RestrictionConfig {
        RestrictionConfig {
            resource: Resource::Proposals,
            role: Role::Rep,
            action: Action::Update,
            limits: vec![Restriction::FieldWrite {
                allowed_fields: allowed.map(|v| v.into_iter().map(str::to_string).collect()),
                restricted_fields: restricted.map(|v| v.into_iter().map(str::to_string).collect()),
            }],
        }
    }

    #[test]
    fn field_write_blocks_restricted_fields() {
        let l = limiter(vec![field_write_config(None, Some(vec!["approvedBy"]))]);
        let mut req = request(Role::Rep, Resource::Proposals, Action::Update, "5");
        req.update_data = Some(json!({"title": "new", "approvedBy": "me"}));

        let outcome = l.check(&req, t0());
        assert!(!outcome.allowed);
        assert_eq!(
            outcome.reason.as_deref(),
            Some("field 'approvedBy' cannot be modified")
        );
    }

    #[test]
    fn field_write_enforces_allow_list() {
        let l = limiter(vec![field_write_config(Some(vec!["title", "body"]), None)]);
        let mut req = request(Role::Rep, Resource::Proposals, Action::Update, "5");

        req.update_data = Some(json!({"title": "new"}));
        assert!(l.check(&req, t0()).allowed);

        req.update_data = Some(json!({"title": "new", "amount": 100}));
        let outcome = l.check(&req, t0());
        assert!(!outcome.allowed);
        assert!(outcome.reason.unwrap().contains("'amount'"));
    }

    /// FieldWrite is a no-op without update data, unlike Precondition.
    #[test]
    fn field_write_is_noop_without_update_data() {
        let l = limiter(vec![field_write_config(None, Some(vec!["approvedBy"]))]);
        let mut req = request(Role::Rep, Resource::Proposals, Action::Update, "5");
        assert!(l.check(&req, t0()).allowed);
        req.update_data = Some(json!("not a map"));
        assert!(l.check(&req, t0()).allowed);
    }

    // ── Preconditions ────────────────────────────────────────────────────────

    #[test]
    fn precondition_requires_resource_data() {
        let l = limiter(vec![RestrictionConfig {
            resource: Resource::Proposals,
            role: Role::Manager,
            action: Action::Approve,
            limits: vec![Restriction::Precondition {
                require_empty_fields: None,
                require_rules: Some(vec![PreconditionRule {
                    field: "status".to_string(),
                    operator: Operator::Equals,
                    value: json!("PENDING_REVIEW"),
                    message: Some("proposal must be pending review before approval".to_string()),
                }]),
            }],
        }]);
        let req = request(Role::Manager, Resource::Proposals, Action::Approve, "2");

        let outcome = l.check(&req, t0());
        assert!(!outcome.allowed);
        assert_eq!(outcome.reason.as_deref(), Some(INVALID_RESOURCE_DATA));
    }

    #[test]
    fn precondition_rule_denies_with_its_message() {
        let l = limiter(vec![RestrictionConfig {
            resource: Resource::Proposals,
            role: Role::Manager,
            action: Action::Approve,
            limits: vec![Restriction::Precondition {
                require_empty_fields: None,
                require_rules: Some(vec![PreconditionRule {
                    field: "status".to_string(),
                    operator: Operator::Equals,
                    value: json!("PENDING_REVIEW"),
                    message: Some("proposal must be pending review before approval".to_string()),
                }]),
            }],
        }]);
        let mut req = request(Role::Manager, Resource::Proposals, Action::Approve, "2");

        req.resource_data = Some(json!({"status": "DRAFT"}));
        let denied = l.check(&req, t0());
        assert!(!denied.allowed);
        assert!(denied.reason.unwrap().contains("pending review"));

        req.resource_data = Some(json!({"status": "PENDING_REVIEW"}));
        assert!(l.check(&req, t0()).allowed);
    }

    #[test]
    fn precondition_empty_fields() {
        let l = limiter(vec![RestrictionConfig {
            resource: Resource::Proposals,
            role: Role::Rep,
            action: Action::Delete,
            limits: vec![Restriction::Precondition {
                require_empty_fields: Some(vec!["approvedAt".to_string()]),
                require_rules: None,
            }],
        }]);
        let mut req = request(Role::Rep, Resource::Proposals, Action::Delete, "5");

        // Missing, null, empty string, and empty array all count as empty.
        for empty in [
            json!({}),
            json!({"approvedAt": null}),
            json!({"approvedAt": ""}),
            json!({"approvedAt": []}),
        ] {
            req.resource_data = Some(empty);
            assert!(l.check(&req, t0()).allowed);
        }

        req.resource_data = Some(json!({"approvedAt": "2026-07-01T00:00:00Z"}));
        let denied = l.check(&req, t0());
        assert!(!denied.allowed);
        assert_eq!(
            denied.reason.as_deref(),
            Some("field 'approvedAt' must be empty")
        );
    }

    // ── Config validation ────────────────────────────────────────────────────

    #[test]
    fn zero_limit_is_a_config_error() {
        let result = Limiter::new(
            vec![rate_config(0, "1h")],
            Box::new(InMemoryCounterStore::new()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn malformed_window_fails_toml_load() {
        let doc = r#"
            [[restrictions]]
            resource = "customers"
            role = "rep"
            action = "create"

            [[restrictions.limits]]
            kind = "rate-limit"
            limit = 20
            window = "1x"
        "#;
        let result = Limiter::from_toml_str(doc, Box::new(InMemoryCounterStore::new()));
        assert!(result.is_err());
    }

    #[test]
    fn loads_from_toml() {
        let doc = r#"
            [[restrictions]]
            resource = "customers"
            role = "rep"
            action = "create"

            [[restrictions.limits]]
            kind = "rate-limit"
            limit = 2
            window = "1h"
        "#;
        let l = Limiter::from_toml_str(doc, Box::new(InMemoryCounterStore::new())).unwrap();
        let req = request(Role::Rep, Resource::Customers, Action::Create, "5");
        assert!(l.check(&req, t0()).allowed);
        assert!(l.check(&req, t0()).allowed);
        assert!(!l.check(&req, t0()).allowed);
    }
}
