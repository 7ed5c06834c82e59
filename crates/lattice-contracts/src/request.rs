//! The engine's input and output types.
//!
//! One `AccessRequest` in, one `AccessDecision` out, per call. Decisions are
//! immutable and produced fresh; the `decision_id` and `decided_at` fields
//! exist so the caller's audit sink can correlate and order them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::principal::{Role, UserId};
use crate::resource::{Action, Resource};

/// Unique identifier for one authorization decision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecisionId(pub Uuid);

impl DecisionId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DecisionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Caller-requested ownership scoping.
///
/// Present only when the caller wants the ownership check enforced.
/// `owner_id = None` marks the resource as ownerless/public, which grants
/// access to any role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipScope {
    pub owner_id: Option<UserId>,
}

/// Everything the engine needs to decide one action.
///
/// `resource_data` is the resource instance's current field map, fetched by
/// the caller; `update_data` is the proposed mutation's field map. Both are
/// optional — the pipeline stages that need them fail closed or skip
/// themselves as specified per stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRequest {
    pub role: Role,
    pub resource: Resource,
    pub action: Action,
    pub user_id: UserId,
    #[serde(default)]
    pub resource_data: Option<serde_json::Value>,
    #[serde(default)]
    pub update_data: Option<serde_json::Value>,
    #[serde(default)]
    pub ownership: Option<OwnershipScope>,
}

/// The verdict of one pipeline stage.
///
/// Carried between the condition and restriction layers and the pipeline;
/// a denial's `reason` is preserved verbatim into the final decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub allowed: bool,
    pub reason: Option<String>,
    /// Admissions left in the tightest rate/quota window, when one applied.
    pub remaining: Option<u32>,
}

impl CheckOutcome {
    /// An unconditional pass.
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
            remaining: None,
        }
    }

    /// A pass that also reports remaining admissions.
    pub fn allow_with_remaining(remaining: u32) -> Self {
        Self {
            allowed: true,
            reason: None,
            remaining: Some(remaining),
        }
    }

    /// A denial with the given reason.
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
            remaining: None,
        }
    }
}

/// The engine's sole output type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessDecision {
    pub decision_id: DecisionId,
    pub allowed: bool,
    /// Denial reason, preserved verbatim from the first failing stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// For read/list actions: the resource data projected down to the fields
    /// the role may see. For other allowed actions: the input data echoed
    /// back unchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered_data: Option<serde_json::Value>,
    /// Admissions left when a rate or quota restriction applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u32>,
    pub decided_at: DateTime<Utc>,
}
