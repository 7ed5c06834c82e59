//! # lattice-conditions
//!
//! Ordered, AND-combined predicate rules over a resource instance's current
//! data.
//!
//! ## Overview
//!
//! This crate provides [`ConditionSet`], which implements the
//! [`ConditionGate`](lattice_core::traits::ConditionGate) trait. A condition
//! config binds an ordered rule list to one (resource, role, action) triple;
//! every matching config's rules must hold, and the first failing rule
//! supplies the denial reason.
//!
//! Rule values may use the `{{userId}}` placeholder, substituted with the
//! acting principal's id at evaluation time. Unknown placeholders are
//! rejected when the table is loaded.

pub mod ops;
pub mod set;

pub use set::{ConditionSet, ConditionTableConfig, INVALID_RESOURCE_DATA};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use lattice_contracts::{
        principal::{Role, UserId},
        resource::{Action, Resource},
        rule::{ConditionConfig, ConditionKind, ConditionRule, Operator},
    };
    use lattice_core::traits::ConditionGate;

    use crate::set::{ConditionSet, INVALID_RESOURCE_DATA};

    fn rule(
        kind: ConditionKind,
        field: &str,
        operator: Operator,
        value: serde_json::Value,
        description: Option<&str>,
    ) -> ConditionRule {
        ConditionRule {
            kind,
            field: field.to_string(),
            operator,
            value,
            description: description.map(str::to_string),
        }
    }

    fn config(
        resource: Resource,
        role: Role,
        action: Action,
        rules: Vec<ConditionRule>,
    ) -> ConditionConfig {
        ConditionConfig {
            resource,
            role,
            action,
            rules,
        }
    }

    fn draft_only_set() -> ConditionSet {
        ConditionSet::new(vec![config(
            Resource::Proposals,
            Role::Rep,
            Action::Update,
            vec![rule(
                ConditionKind::Status,
                "status",
                Operator::In,
                json!(["DRAFT", "PENDING_REVIEW"]),
                Some("proposals may only be updated while in draft or pending review"),
            )],
        )])
        .unwrap()
    }

    #[test]
    fn no_matching_config_allows() {
        let set = draft_only_set();
        let outcome = set.evaluate(
            Role::Manager,
            Resource::Proposals,
            Action::Update,
            Some(&json!({"status": "ANYTHING"})),
            &UserId::new("1"),
        );
        assert!(outcome.allowed);
    }

    #[test]
    fn passing_rules_allow() {
        let set = draft_only_set();
        let outcome = set.evaluate(
            Role::Rep,
            Resource::Proposals,
            Action::Update,
            Some(&json!({"status": "DRAFT"})),
            &UserId::new("5"),
        );
        assert!(outcome.allowed);
    }

    #[test]
    fn failing_rule_reports_its_description() {
        let set = draft_only_set();
        let outcome = set.evaluate(
            Role::Rep,
            Resource::Proposals,
            Action::Update,
            Some(&json!({"status": "APPROVED"})),
            &UserId::new("5"),
        );
        assert!(!outcome.allowed);
        assert!(outcome
            .reason
            .unwrap()
            .contains("draft or pending review"));
    }

    #[test]
    fn missing_data_fails_closed_when_configs_match() {
        let set = draft_only_set();
        for data in [None, Some(json!("not a map")), Some(json!([1, 2]))] {
            let outcome = set.evaluate(
                Role::Rep,
                Resource::Proposals,
                Action::Update,
                data.as_ref(),
                &UserId::new("5"),
            );
            assert!(!outcome.allowed);
            assert_eq!(outcome.reason.as_deref(), Some(INVALID_RESOURCE_DATA));
        }
    }

    /// AND semantics across configs: with two configs that would each fail,
    /// only the first config's first failing rule is reported.
    #[test]
    fn first_violation_wins_across_configs() {
        let set = ConditionSet::new(vec![
            config(
                Resource::Proposals,
                Role::Rep,
                Action::Update,
                vec![rule(
                    ConditionKind::Status,
                    "status",
                    Operator::Equals,
                    json!("DRAFT"),
                    Some("first: must be draft"),
                )],
            ),
            config(
                Resource::Proposals,
                Role::Rep,
                Action::Update,
                vec![rule(
                    ConditionKind::Attribute,
                    "locked",
                    Operator::Equals,
                    json!(false),
                    Some("second: must be unlocked"),
                )],
            ),
        ])
        .unwrap();

        let outcome = set.evaluate(
            Role::Rep,
            Resource::Proposals,
            Action::Update,
            Some(&json!({"status": "APPROVED", "locked": true})),
            &UserId::new("5"),
        );
        assert!(!outcome.allowed);
        assert_eq!(outcome.reason.as_deref(), Some("first: must be draft"));
    }

    /// Rules within one config also abort at the first failure, in
    /// declaration order.
    #[test]
    fn rules_evaluate_in_declaration_order() {
        let set = ConditionSet::new(vec![config(
            Resource::Opportunities,
            Role::Rep,
            Action::Delete,
            vec![
                rule(
                    ConditionKind::Status,
                    "stage",
                    Operator::NotEquals,
                    json!("CLOSED_WON"),
                    Some("closed-won opportunities cannot be deleted"),
                ),
                rule(
                    ConditionKind::Attribute,
                    "amount",
                    Operator::Lt,
                    json!(10_000),
                    Some("large opportunities cannot be deleted"),
                ),
            ],
        )])
        .unwrap();

        let outcome = set.evaluate(
            Role::Rep,
            Resource::Opportunities,
            Action::Delete,
            Some(&json!({"stage": "CLOSED_WON", "amount": 50_000})),
            &UserId::new("5"),
        );
        assert_eq!(
            outcome.reason.as_deref(),
            Some("closed-won opportunities cannot be deleted")
        );
    }

    #[test]
    fn user_id_placeholder_substitutes() {
        let set = ConditionSet::new(vec![config(
            Resource::Customers,
            Role::Rep,
            Action::Update,
            vec![rule(
                ConditionKind::Relationship,
                "assignedUserId",
                Operator::Equals,
                json!("{{userId}}"),
                Some("customers may only be updated by their assigned rep"),
            )],
        )])
        .unwrap();

        // Matching id: numeric column, numeric substitution.
        let allowed = set.evaluate(
            Role::Rep,
            Resource::Customers,
            Action::Update,
            Some(&json!({"assignedUserId": 5})),
            &UserId::new("5"),
        );
        assert!(allowed.allowed);

        // Acting user 10 against a record assigned to 5.
        let denied = set.evaluate(
            Role::Rep,
            Resource::Customers,
            Action::Update,
            Some(&json!({"assignedUserId": 5})),
            &UserId::new("10"),
        );
        assert!(!denied.allowed);
        assert!(denied.reason.unwrap().contains("assigned rep"));
    }

    #[test]
    fn missing_description_gets_a_generated_reason() {
        let set = ConditionSet::new(vec![config(
            Resource::Proposals,
            Role::Rep,
            Action::Update,
            vec![rule(
                ConditionKind::Status,
                "status",
                Operator::Equals,
                json!("DRAFT"),
                None,
            )],
        )])
        .unwrap();

        let outcome = set.evaluate(
            Role::Rep,
            Resource::Proposals,
            Action::Update,
            Some(&json!({"status": "APPROVED"})),
            &UserId::new("5"),
        );
        let reason = outcome.reason.unwrap();
        assert!(reason.contains("status"));
        assert!(reason.contains("equals"));
    }

    #[test]
    fn unknown_placeholder_fails_at_load() {
        let result = ConditionSet::new(vec![config(
            Resource::Customers,
            Role::Rep,
            Action::Update,
            vec![rule(
                ConditionKind::Relationship,
                "tenantId",
                Operator::Equals,
                json!("{{tenantId}}"),
                None,
            )],
        )]);
        assert!(result.is_err());
    }

    #[test]
    fn in_operator_with_scalar_value_fails_at_load() {
        let result = ConditionSet::new(vec![config(
            Resource::Proposals,
            Role::Rep,
            Action::Update,
            vec![rule(
                ConditionKind::Status,
                "status",
                Operator::In,
                json!("DRAFT"),
                None,
            )],
        )]);
        assert!(result.is_err());
    }

    #[test]
    fn loads_from_toml() {
        let doc = r#"
            [[conditions]]
            resource = "proposals"
            role = "rep"
            action = "update"

            [[conditions.rules]]
            kind = "status"
            field = "status"
            operator = "in"
            value = ["DRAFT", "PENDING_REVIEW"]
            description = "proposals may only be updated while in draft or pending review"
        "#;
        let set = ConditionSet::from_toml_str(doc).unwrap();
        let outcome = set.evaluate(
            Role::Rep,
            Resource::Proposals,
            Action::Update,
            Some(&json!({"status": "PENDING_REVIEW"})),
            &UserId::new("5"),
        );
        assert!(outcome.allowed);
    }
}
