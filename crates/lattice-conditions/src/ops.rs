//! Operator application and placeholder substitution.
//!
//! Shared by the condition evaluator and the precondition restriction in
//! `lattice-limits`, so both layers compare values with identical semantics.

use std::cmp::Ordering;

use serde_json::Value;

use lattice_contracts::{
    error::{AuthzError, AuthzResult},
    principal::UserId,
    rule::Operator,
};

/// The only placeholder token the engine defines.
pub const USER_ID_PLACEHOLDER: &str = "{{userId}}";

/// Substitute the acting principal's id into a configured rule value.
///
/// Substitution is type-aware: an all-digit id becomes a JSON number so
/// strict equality holds against numeric id columns; any other id becomes a
/// JSON string. Non-placeholder values are returned unchanged.
pub fn resolve_value(value: &Value, user_id: &UserId) -> Value {
    match value.as_str() {
        Some(USER_ID_PLACEHOLDER) => match user_id.0.parse::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => Value::String(user_id.0.clone()),
        },
        _ => value.clone(),
    }
}

/// Reject unknown `{{…}}` tokens in a configured rule value.
///
/// Called at configuration-load time so a typo like `{{userld}}` fails the
/// load instead of silently comparing as a literal string per request.
/// Array values (for `in`/`not-in`) are validated element-wise.
pub fn validate_placeholders(value: &Value) -> AuthzResult<()> {
    match value {
        Value::String(s) => {
            if s.starts_with("{{") && s.ends_with("}}") && s != USER_ID_PLACEHOLDER {
                return Err(AuthzError::ConfigError {
                    reason: format!("unknown placeholder '{}'", s),
                });
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(validate_placeholders),
        _ => Ok(()),
    }
}

/// Apply `operator` to the record's field value and the (already resolved)
/// rule value. Returns false for any type mismatch — a rule that cannot be
/// evaluated is a rule that did not hold.
pub fn apply_operator(operator: Operator, actual: Option<&Value>, expected: &Value) -> bool {
    match operator {
        Operator::Equals => actual == Some(expected),
        Operator::NotEquals => actual != Some(expected),
        Operator::In => match (actual, expected.as_array()) {
            (Some(a), Some(items)) => items.contains(a),
            _ => false,
        },
        Operator::NotIn => match expected.as_array() {
            Some(items) => actual.map_or(true, |a| !items.contains(a)),
            None => false,
        },
        Operator::Contains => match (actual.and_then(Value::as_str), expected.as_str()) {
            (Some(haystack), Some(needle)) => haystack.contains(needle),
            _ => false,
        },
        Operator::Gt => compare(actual, expected) == Some(Ordering::Greater),
        Operator::Lt => compare(actual, expected) == Some(Ordering::Less),
        Operator::Gte => matches!(
            compare(actual, expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::Lte => matches!(
            compare(actual, expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
    }
}

/// Order two JSON values: numerically when both are numbers, lexically when
/// both are strings (which covers ISO-8601 timestamps), `None` otherwise.
fn compare(actual: Option<&Value>, expected: &Value) -> Option<Ordering> {
    let actual = actual?;
    if let (Some(a), Some(e)) = (actual.as_f64(), expected.as_f64()) {
        a.partial_cmp(&e)
    } else if let (Some(a), Some(e)) = (actual.as_str(), expected.as_str()) {
        Some(a.cmp(e))
    } else {
        None
    }
}
