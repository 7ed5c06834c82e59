//! Condition rule types and configuration schema.
//!
//! A `ConditionConfig` attaches an ordered list of predicate rules to one
//! (resource, role, action) triple. Every config matching an incoming request
//! contributes its rules; all rules AND together, in declaration order, and
//! the first failing rule supplies the denial reason.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::principal::Role;
use crate::resource::{Action, Resource};

/// What aspect of the resource instance a rule inspects.
///
/// Purely descriptive — evaluation is identical across kinds — but the kind
/// is kept in configuration and log output so operators can see at a glance
/// whether a denial came from a workflow-state check or a relationship check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionKind {
    /// Workflow state, e.g. `status == "DRAFT"`.
    Status,
    /// Any other plain attribute of the record.
    Attribute,
    /// A link to another principal, e.g. `assignedUserId == {{userId}}`.
    Relationship,
    /// A timestamp comparison, e.g. `expiresAt > <now>`.
    Time,
    /// Domain-specific checks that fit none of the above.
    Custom,
}

/// The comparison a rule applies between the record's field and the rule value.
///
/// TOML spelling is kebab-case: `"equals"`, `"not-equals"`, `"in"`,
/// `"not-in"`, `"contains"`, `"gt"`, `"lt"`, `"gte"`, `"lte"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operator {
    Equals,
    NotEquals,
    In,
    NotIn,
    Contains,
    Gt,
    Lt,
    Gte,
    Lte,
}

impl Operator {
    /// The kebab-case token, used in generated denial reasons.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not-equals",
            Operator::In => "in",
            Operator::NotIn => "not-in",
            Operator::Contains => "contains",
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::Gte => "gte",
            Operator::Lte => "lte",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One predicate over a resource instance's current data.
///
/// `value` is either a JSON literal (string, number, array for `in`/`not-in`)
/// or the placeholder string `"{{userId}}"`, which is substituted with the
/// acting principal's id at evaluation time. Unknown `{{…}}` tokens are
/// rejected when the condition table is loaded, not silently treated as
/// literals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionRule {
    /// What the rule inspects; descriptive only.
    pub kind: ConditionKind,

    /// The field of the resource record to test.
    pub field: String,

    /// The comparison to apply.
    pub operator: Operator,

    /// Literal value or `"{{userId}}"` placeholder.
    pub value: serde_json::Value,

    /// Human-readable explanation, used verbatim as the denial reason when
    /// this rule is the first to fail. A generated fallback is used when
    /// absent.
    #[serde(default)]
    pub description: Option<String>,
}

/// An ordered rule list bound to one (resource, role, action) triple.
///
/// Multiple configs may target the same triple; all of them apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionConfig {
    pub resource: Resource,
    pub role: Role,
    pub action: Action,
    /// Evaluated in declaration order; first failure wins.
    pub rules: Vec<ConditionRule>,
}

impl ConditionConfig {
    /// Return true if this config applies to the given triple.
    pub fn matches(&self, role: Role, resource: Resource, action: Action) -> bool {
        self.role == role && self.resource == resource && self.action == action
    }
}
