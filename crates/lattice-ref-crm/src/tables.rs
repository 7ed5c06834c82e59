//! The reference CRM policy tables.
//!
//! These are the tables a small multi-tenant CRM ships with out of the box:
//! five roles, six resources, proposal workflow conditions, a create rate
//! limit for reps, an export quota, and sensitivity entries for financial
//! fields. Hosts with their own policies load TOML instead; these tables are
//! the working example and the scenario-test fixture.

use std::collections::HashSet;

use serde_json::json;

use lattice_contracts::{
    error::AuthzResult,
    principal::Role,
    resource::{Action, Resource},
    restriction::{Period, PreconditionRule, Restriction, RestrictionConfig, Window},
    rule::{ConditionConfig, ConditionKind, ConditionRule, Operator},
    sensitivity::{FieldRule, Sensitivity},
};
use lattice_core::AccessGate;
use lattice_limits::{InMemoryCounterStore, Limiter};
use lattice_policy::{PermissionGrant, PolicyMatrix};
use lattice_visibility::FieldPolicy;

fn grant(role: Role, resource: Resource, actions: &[Action]) -> PermissionGrant {
    PermissionGrant {
        role,
        resource,
        actions: actions.iter().copied().collect(),
    }
}

fn roles(list: &[Role]) -> HashSet<Role> {
    list.iter().copied().collect()
}

/// The coarse permission matrix for the reference CRM.
pub fn reference_matrix() -> AuthzResult<PolicyMatrix> {
    use Action::*;
    use Resource::*;

    PolicyMatrix::new(vec![
        // Admin manages everything.
        grant(Role::Admin, Customers, &[Manage]),
        grant(Role::Admin, Proposals, &[Manage]),
        grant(Role::Admin, Opportunities, &[Manage]),
        grant(Role::Admin, KnowledgeBase, &[Manage]),
        grant(Role::Admin, Templates, &[Manage]),
        grant(Role::Admin, Users, &[Manage]),
        // Managers run the sales side and assign users.
        grant(Role::Manager, Customers, &[Manage]),
        grant(Role::Manager, Proposals, &[Manage]),
        grant(Role::Manager, Opportunities, &[Manage]),
        grant(Role::Manager, Templates, &[Manage]),
        grant(Role::Manager, KnowledgeBase, &[Read, List, Search, Approve]),
        grant(Role::Manager, Users, &[Read, List, Assign]),
        // Reps work their own book of business.
        grant(
            Role::Rep,
            Customers,
            &[Create, Read, Update, List, Search],
        ),
        grant(
            Role::Rep,
            Proposals,
            &[Create, Read, Update, Delete, List],
        ),
        grant(
            Role::Rep,
            Opportunities,
            &[Create, Read, Update, List, Export],
        ),
        grant(Role::Rep, KnowledgeBase, &[Read, List, Search]),
        grant(Role::Rep, Templates, &[Read, List]),
        // Content editors own the knowledge base and templates.
        grant(
            Role::ContentEditor,
            KnowledgeBase,
            &[Create, Read, Update, Delete, List, Search, Publish],
        ),
        grant(
            Role::ContentEditor,
            Templates,
            &[Create, Read, Update, List],
        ),
        // Viewers read unrestricted data.
        grant(Role::Viewer, Customers, &[Read, List]),
        grant(Role::Viewer, Proposals, &[Read, List]),
        grant(Role::Viewer, Opportunities, &[Read, List]),
        grant(Role::Viewer, KnowledgeBase, &[Read, List, Search]),
    ])
}

/// Condition rules binding proposal workflow state and customer assignment.
pub fn reference_conditions() -> AuthzResult<lattice_conditions::ConditionSet> {
    lattice_conditions::ConditionSet::new(vec![
        // Reps may only edit proposals that are still in flight.
        ConditionConfig {
            resource: Resource::Proposals,
            role: Role::Rep,
            action: Action::Update,
            rules: vec![ConditionRule {
                kind: ConditionKind::Status,
                field: "status".to_string(),
                operator: Operator::In,
                value: json!(["DRAFT", "PENDING_REVIEW"]),
                description: Some(
                    "proposals may only be updated while in draft or pending review".to_string(),
                ),
            }],
        },
        // Reps may only delete drafts.
        ConditionConfig {
            resource: Resource::Proposals,
            role: Role::Rep,
            action: Action::Delete,
            rules: vec![ConditionRule {
                kind: ConditionKind::Status,
                field: "status".to_string(),
                operator: Operator::Equals,
                value: json!("DRAFT"),
                description: Some("only draft proposals may be deleted".to_string()),
            }],
        },
        // Reps may only touch customers assigned to them.
        ConditionConfig {
            resource: Resource::Customers,
            role: Role::Rep,
            action: Action::Update,
            rules: vec![ConditionRule {
                kind: ConditionKind::Relationship,
                field: "assignedUserId".to_string(),
                operator: Operator::Equals,
                value: json!("{{userId}}"),
                description: Some(
                    "customers may only be updated by their assigned rep".to_string(),
                ),
            }],
        },
        // Archived articles are frozen for editors.
        ConditionConfig {
            resource: Resource::KnowledgeBase,
            role: Role::ContentEditor,
            action: Action::Update,
            rules: vec![ConditionRule {
                kind: ConditionKind::Status,
                field: "status".to_string(),
                operator: Operator::NotEquals,
                value: json!("ARCHIVED"),
                description: Some("archived articles cannot be edited".to_string()),
            }],
        },
    ])
}

/// Action restrictions: rate limits, quotas, writable fields, preconditions.
pub fn reference_restrictions() -> Vec<RestrictionConfig> {
    vec![
        // Reps create at most 20 customers per hour.
        RestrictionConfig {
            resource: Resource::Customers,
            role: Role::Rep,
            action: Action::Create,
            limits: vec![Restriction::RateLimit {
                limit: 20,
                window: Window::from_secs(3_600),
            }],
        },
        // Reps export at most 100 opportunity reports per day.
        RestrictionConfig {
            resource: Resource::Opportunities,
            role: Role::Rep,
            action: Action::Export,
            limits: vec![Restriction::Quota {
                limit: 100,
                period: Period::Day,
            }],
        },
        // Approval metadata is written by the approval flow, not by edits.
        RestrictionConfig {
            resource: Resource::Proposals,
            role: Role::Rep,
            action: Action::Update,
            limits: vec![Restriction::FieldWrite {
                allowed_fields: None,
                restricted_fields: Some(vec![
                    "approvedBy".to_string(),
                    "approvedAt".to_string(),
                ]),
            }],
        },
        // Approval requires the proposal to have reached review.
        RestrictionConfig {
            resource: Resource::Proposals,
            role: Role::Manager,
            action: Action::Approve,
            limits: vec![Restriction::Precondition {
                require_empty_fields: None,
                require_rules: Some(vec![PreconditionRule {
                    field: "status".to_string(),
                    operator: Operator::Equals,
                    value: json!("PENDING_REVIEW"),
                    message: Some(
                        "proposal must be in pending review before approval".to_string(),
                    ),
                }]),
            }],
        },
        // An already-approved proposal cannot be deleted by its rep.
        RestrictionConfig {
            resource: Resource::Proposals,
            role: Role::Rep,
            action: Action::Delete,
            limits: vec![Restriction::Precondition {
                require_empty_fields: Some(vec!["approvedAt".to_string()]),
                require_rules: None,
            }],
        },
    ]
}

/// Sensitivity entries for financial and HR fields.
pub fn reference_field_rules() -> AuthzResult<FieldPolicy> {
    FieldPolicy::new(vec![
        FieldRule {
            resource: Resource::Customers,
            field: "revenue".to_string(),
            sensitivity: Sensitivity::Confidential,
            allowed_roles: roles(&[Role::Admin, Role::Manager]),
        },
        FieldRule {
            resource: Resource::Customers,
            field: "creditScore".to_string(),
            sensitivity: Sensitivity::Restricted,
            allowed_roles: roles(&[Role::Admin]),
        },
        FieldRule {
            resource: Resource::Customers,
            field: "internalNotes".to_string(),
            sensitivity: Sensitivity::Internal,
            allowed_roles: roles(&[Role::Admin, Role::Manager, Role::Rep]),
        },
        FieldRule {
            resource: Resource::Opportunities,
            field: "margin".to_string(),
            sensitivity: Sensitivity::Confidential,
            allowed_roles: roles(&[Role::Admin, Role::Manager]),
        },
        FieldRule {
            resource: Resource::Users,
            field: "salary".to_string(),
            sensitivity: Sensitivity::Restricted,
            allowed_roles: roles(&[Role::Admin]),
        },
    ])
}

/// Wire the reference tables into a ready-to-use gate with an in-memory
/// counter store. Each call builds fresh counters.
pub fn reference_gate() -> AuthzResult<AccessGate> {
    let matrix = reference_matrix()?;
    let limiter = Limiter::new(
        reference_restrictions(),
        Box::new(InMemoryCounterStore::new()),
    )?;
    let conditions = reference_conditions()?;
    let fields = reference_field_rules()?;

    Ok(AccessGate::new(
        Box::new(matrix),
        Box::new(limiter),
        Box::new(conditions),
        Box::new(fields),
    ))
}
