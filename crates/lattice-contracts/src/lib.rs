//! # lattice-contracts
//!
//! Shared types, configuration schema, and error types for the lattice
//! authorization engine.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions and error types.

pub mod error;
pub mod principal;
pub mod request;
pub mod resource;
pub mod restriction;
pub mod rule;
pub mod sensitivity;

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use error::AuthzError;
    use principal::{Role, UserId};
    use request::{AccessDecision, CheckOutcome, DecisionId};
    use resource::{Action, Resource};
    use restriction::{Period, Restriction, Window};
    use rule::Operator;

    // ── Role / Resource / Action tokens ─────────────────────────────────────

    #[test]
    fn role_tokens_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn resource_tokens_round_trip() {
        for resource in Resource::ALL {
            assert_eq!(Resource::from_str(resource.as_str()).unwrap(), resource);
        }
    }

    #[test]
    fn action_tokens_round_trip() {
        for action in Action::ALL {
            assert_eq!(Action::from_str(action.as_str()).unwrap(), action);
        }
    }

    #[test]
    fn unknown_role_token_is_a_parse_error() {
        let err = Role::from_str("superuser").unwrap_err();
        match err {
            AuthzError::ParseError { kind, value } => {
                assert_eq!(kind, "role");
                assert_eq!(value, "superuser");
            }
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn role_serde_uses_kebab_case() {
        let json = serde_json::to_string(&Role::ContentEditor).unwrap();
        assert_eq!(json, "\"content-editor\"");
        let decoded: Role = serde_json::from_str("\"content-editor\"").unwrap();
        assert_eq!(decoded, Role::ContentEditor);
    }

    // ── Window parsing ───────────────────────────────────────────────────────

    #[test]
    fn window_parses_each_unit() {
        let cases = [("30s", 30), ("15m", 900), ("1h", 3_600), ("2d", 172_800)];
        for (token, secs) in cases {
            let w = Window::try_from(token.to_string()).unwrap();
            assert_eq!(w.duration().num_seconds(), secs, "token {}", token);
        }
    }

    #[test]
    fn window_rejects_malformed_durations() {
        for bad in ["1x", "h", "", "-5m", "0s", "an hour"] {
            assert!(
                Window::try_from(bad.to_string()).is_err(),
                "'{}' should not parse",
                bad
            );
        }
    }

    #[test]
    fn window_display_uses_largest_even_unit() {
        assert_eq!(Window::from_secs(3_600).to_string(), "1h");
        assert_eq!(Window::from_secs(90).to_string(), "90s");
        assert_eq!(Window::from_secs(86_400).to_string(), "1d");
    }

    #[test]
    fn period_durations() {
        assert_eq!(Period::Day.duration().num_days(), 1);
        assert_eq!(Period::Week.duration().num_days(), 7);
        assert_eq!(Period::Month.duration().num_days(), 30);
    }

    // ── Restriction TOML shape ───────────────────────────────────────────────

    #[test]
    fn restriction_rate_limit_parses_from_toml() {
        let doc = r#"
            kind = "rate-limit"
            limit = 20
            window = "1h"
        "#;
        let r: Restriction = toml::from_str(doc).unwrap();
        match r {
            Restriction::RateLimit { limit, window } => {
                assert_eq!(limit, 20);
                assert_eq!(window.duration().num_seconds(), 3_600);
            }
            other => panic!("expected RateLimit, got {:?}", other),
        }
    }

    #[test]
    fn restriction_malformed_window_fails_at_parse_time() {
        let doc = r#"
            kind = "rate-limit"
            limit = 20
            window = "1x"
        "#;
        let result: Result<Restriction, _> = toml::from_str(doc);
        assert!(result.is_err(), "malformed window must fail config load");
    }

    #[test]
    fn restriction_field_write_defaults_optional_lists() {
        let doc = r#"
            kind = "field-write"
            restricted_fields = ["approvedBy"]
        "#;
        let r: Restriction = toml::from_str(doc).unwrap();
        match r {
            Restriction::FieldWrite {
                allowed_fields,
                restricted_fields,
            } => {
                assert!(allowed_fields.is_none());
                assert_eq!(restricted_fields.unwrap(), vec!["approvedBy"]);
            }
            other => panic!("expected FieldWrite, got {:?}", other),
        }
    }

    // ── Operators ────────────────────────────────────────────────────────────

    #[test]
    fn operator_serde_uses_kebab_case() {
        let json = serde_json::to_string(&Operator::NotEquals).unwrap();
        assert_eq!(json, "\"not-equals\"");
        assert_eq!(Operator::Gte.to_string(), "gte");
    }

    // ── Decisions ────────────────────────────────────────────────────────────

    #[test]
    fn decision_id_new_produces_unique_values() {
        let ids: Vec<DecisionId> = (0..100).map(|_| DecisionId::new()).collect();
        let unique: std::collections::HashSet<String> =
            ids.iter().map(|id| id.0.to_string()).collect();
        assert_eq!(unique.len(), 100);
    }

    #[test]
    fn decision_round_trips_through_json() {
        let original = AccessDecision {
            decision_id: DecisionId::new(),
            allowed: false,
            reason: Some("rate limit exceeded".to_string()),
            filtered_data: None,
            remaining: Some(0),
            decided_at: chrono::Utc::now(),
        };
        let json = serde_json::to_string(&original).unwrap();
        let decoded: AccessDecision = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.allowed, false);
        assert_eq!(decoded.reason.as_deref(), Some("rate limit exceeded"));
        assert_eq!(decoded.remaining, Some(0));
        assert_eq!(decoded.decision_id, original.decision_id);
    }

    #[test]
    fn check_outcome_constructors() {
        assert!(CheckOutcome::allow().allowed);
        let with_remaining = CheckOutcome::allow_with_remaining(19);
        assert_eq!(with_remaining.remaining, Some(19));
        let denied = CheckOutcome::deny("not permitted");
        assert!(!denied.allowed);
        assert_eq!(denied.reason.as_deref(), Some("not permitted"));
    }

    // ── Error display ────────────────────────────────────────────────────────

    #[test]
    fn error_config_error_display() {
        let err = AuthzError::ConfigError {
            reason: "unknown placeholder '{{tenantId}}'".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("configuration error"));
        assert!(msg.contains("tenantId"));
    }

    #[test]
    fn user_id_display_is_the_raw_token() {
        assert_eq!(UserId::new("5").to_string(), "5");
    }
}
