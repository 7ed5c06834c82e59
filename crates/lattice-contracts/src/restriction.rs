//! Action-level restriction types: rate limits, quotas, writable-field
//! restrictions, and preconditions.
//!
//! Restrictions constrain the *operation itself* — how often it may run and
//! what it may touch — independently of the resource's business state, which
//! is the condition layer's job. Each restriction is a proper enum variant so
//! its evaluator is exhaustively type-checked.
//!
//! Window and period strings are parsed once, inside serde, at configuration
//! load. A malformed duration ("1x") fails the load; it can never surface
//! mid-request.

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::principal::{Role, UserId};
use crate::resource::{Action, Resource};
use crate::rule::Operator;

/// A rolling rate-limit window, parsed from a compact duration string.
///
/// Accepted forms: `"30s"`, `"15m"`, `"1h"`, `"1d"` — a positive integer
/// followed by a single unit suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Window {
    secs: i64,
}

impl Window {
    /// A window spanning the given number of seconds. Panics if `secs` is not
    /// positive — construction from configuration goes through `TryFrom`,
    /// which validates instead.
    pub fn from_secs(secs: i64) -> Self {
        assert!(secs > 0, "window must be positive");
        Self { secs }
    }

    /// The window length as a `chrono::Duration`.
    pub fn duration(self) -> Duration {
        Duration::seconds(self.secs)
    }
}

impl TryFrom<String> for Window {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let s = s.trim();
        if !s.is_ascii() || s.is_empty() {
            return Err(format!("invalid window duration '{}'", s));
        }
        let (digits, unit) = s.split_at(s.len() - 1);
        let count: i64 = digits
            .parse()
            .map_err(|_| format!("invalid window duration '{}'", s))?;
        if count <= 0 {
            return Err(format!("window duration must be positive, got '{}'", s));
        }
        let secs = match unit {
            "s" => count,
            "m" => count * 60,
            "h" => count * 3_600,
            "d" => count * 86_400,
            _ => return Err(format!("invalid window unit in '{}', expected s/m/h/d", s)),
        };
        Ok(Window { secs })
    }
}

impl From<Window> for String {
    fn from(w: Window) -> String {
        w.to_string()
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Render with the largest unit that divides evenly.
        if self.secs % 86_400 == 0 {
            write!(f, "{}d", self.secs / 86_400)
        } else if self.secs % 3_600 == 0 {
            write!(f, "{}h", self.secs / 3_600)
        } else if self.secs % 60 == 0 {
            write!(f, "{}m", self.secs / 60)
        } else {
            write!(f, "{}s", self.secs)
        }
    }
}

/// A quota period: a long, fixed-duration bucket anchored at first use.
///
/// TOML spelling: `"day"`, `"week"`, `"month"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    /// The period length as a `chrono::Duration`. Months are approximated at
    /// 30 days; quota buckets are anchored at first use, not at calendar
    /// boundaries.
    pub fn duration(self) -> Duration {
        match self {
            Period::Day => Duration::days(1),
            Period::Week => Duration::days(7),
            Period::Month => Duration::days(30),
        }
    }

    /// The configuration token, used in denial reasons.
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `{field, operator, value}` check inside a precondition restriction.
///
/// Uses the same operator semantics as condition rules, including
/// `{{userId}}` substitution. `message` overrides the generated denial
/// reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreconditionRule {
    pub field: String,
    pub operator: Operator,
    pub value: serde_json::Value,
    #[serde(default)]
    pub message: Option<String>,
}

/// One restriction on an operation.
///
/// TOML uses internally-tagged maps:
///
/// ```toml
/// [[restrictions.limits]]
/// kind = "rate-limit"
/// limit = 20
/// window = "1h"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Restriction {
    /// At most `limit` admissions per rolling `window`, per acting user.
    RateLimit { limit: u32, window: Window },

    /// At most `limit` admissions per `period`, per acting user. Same
    /// counter mechanics as `RateLimit` but a distinct counter namespace, so
    /// a short rate window and a long quota never share a bucket.
    Quota { limit: u32, period: Period },

    /// Constrains which fields a mutation may touch. A no-op when the
    /// request carries no update data.
    FieldWrite {
        /// When present, every updated field must be in this list.
        #[serde(default)]
        allowed_fields: Option<Vec<String>>,
        /// When present, no updated field may be in this list.
        #[serde(default)]
        restricted_fields: Option<Vec<String>>,
    },

    /// Requirements on the resource's current data that must hold before the
    /// operation runs. Fails closed when the request carries no resource
    /// data.
    Precondition {
        /// Fields that must be empty (missing, null, "", or []).
        #[serde(default)]
        require_empty_fields: Option<Vec<String>>,
        /// Rules that must all be satisfied.
        #[serde(default)]
        require_rules: Option<Vec<PreconditionRule>>,
    },
}

/// A restriction list bound to one (resource, role, action) triple.
///
/// Multiple configs may target the same triple; all of them apply, and every
/// restriction must pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestrictionConfig {
    pub resource: Resource,
    pub role: Role,
    pub action: Action,
    pub limits: Vec<Restriction>,
}

impl RestrictionConfig {
    /// Return true if this config applies to the given triple.
    pub fn matches(&self, role: Role, resource: Resource, action: Action) -> bool {
        self.role == role && self.resource == resource && self.action == action
    }
}

/// Which counter namespace a key belongs to.
///
/// Rate and quota counters for the same (role, resource, action, user) must
/// never collide, so the namespace is part of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CounterKind {
    Rate,
    Quota,
}

/// The identity of one time-windowed counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CounterKey {
    pub role: Role,
    pub resource: Resource,
    pub action: Action,
    pub user_id: UserId,
    pub kind: CounterKind,
}

/// The outcome of one counter hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterVerdict {
    /// The hit was admitted; `remaining` admissions are left in the window.
    Admitted { remaining: u32 },
    /// The counter is at capacity; the window resets in `retry_after_secs`.
    Exhausted { retry_after_secs: i64 },
}
