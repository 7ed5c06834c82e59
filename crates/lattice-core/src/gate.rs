//! The lattice decision pipeline.
//!
//! One `AccessGate` per loaded policy set. Every call runs the same fixed
//! stage order and short-circuits on the first denial, with the denying
//! stage's reason preserved verbatim:
//!
//!   RoleMatrix → Ownership (opt-in) → ActionLimiter → ConditionGate → FieldFilter
//!
//! Conditions run only for update/delete requests that carry resource data;
//! field filtering runs only for read/list requests that carry resource
//! data. A successful decision echoes the input data when no filter stage
//! ran, and carries `remaining` when the limiter produced one.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use lattice_contracts::{
    request::{AccessDecision, AccessRequest, DecisionId},
    resource::Action,
};

use crate::ownership::OwnershipResolver;
use crate::traits::{ActionLimiter, ConditionGate, FieldFilter, RoleMatrix};

/// The composed decision engine.
///
/// Holds boxed implementations of each layer; construct once at startup from
/// loaded policy tables and share behind an `Arc` in multi-threaded hosts.
/// No stage performs I/O, so `decide` never blocks.
pub struct AccessGate {
    matrix: Box<dyn RoleMatrix>,
    limiter: Box<dyn ActionLimiter>,
    conditions: Box<dyn ConditionGate>,
    fields: Box<dyn FieldFilter>,
    ownership: OwnershipResolver,
}

impl AccessGate {
    /// Create a gate from the four layer implementations.
    pub fn new(
        matrix: Box<dyn RoleMatrix>,
        limiter: Box<dyn ActionLimiter>,
        conditions: Box<dyn ConditionGate>,
        fields: Box<dyn FieldFilter>,
    ) -> Self {
        Self {
            matrix,
            limiter,
            conditions,
            fields,
            ownership: OwnershipResolver::new(),
        }
    }

    /// Decide one request at the current wall-clock time.
    pub fn decide(&self, req: &AccessRequest) -> AccessDecision {
        self.decide_at(req, Utc::now())
    }

    /// Decide one request at an explicit `now`.
    ///
    /// The timestamp feeds rate/quota window arithmetic and the decision's
    /// `decided_at` field; tests use it to step through windows without
    /// sleeping.
    pub fn decide_at(&self, req: &AccessRequest, now: DateTime<Utc>) -> AccessDecision {
        debug!(
            role = %req.role,
            resource = %req.resource,
            action = %req.action,
            user_id = %req.user_id,
            "evaluating access request"
        );

        // ── Stage 1: coarse permission matrix ────────────────────────────────
        if !self.matrix.allows(req.role, req.resource, req.action) {
            return self.denied(
                req,
                format!(
                    "role '{}' is not permitted to {} {}",
                    req.role, req.action, req.resource
                ),
                None,
                now,
            );
        }

        // ── Stage 2: ownership scoping (only when the caller asked) ──────────
        if let Some(scope) = &req.ownership {
            if !self
                .ownership
                .owns(req.role, &req.user_id, scope.owner_id.as_ref())
            {
                return self.denied(
                    req,
                    format!("user '{}' does not own this {}", req.user_id, req.resource),
                    None,
                    now,
                );
            }
        }

        // ── Stage 3: action restrictions ─────────────────────────────────────
        let limits = self.limiter.check(req, now);
        if !limits.allowed {
            let reason = limits
                .reason
                .unwrap_or_else(|| "restriction check failed".to_string());
            return self.denied(req, reason, limits.remaining, now);
        }
        let remaining = limits.remaining;

        // ── Stage 4: resource conditions (update/delete with data only) ──────
        if matches!(req.action, Action::Update | Action::Delete) && req.resource_data.is_some() {
            let outcome = self.conditions.evaluate(
                req.role,
                req.resource,
                req.action,
                req.resource_data.as_ref(),
                &req.user_id,
            );
            if !outcome.allowed {
                let reason = outcome
                    .reason
                    .unwrap_or_else(|| "condition check failed".to_string());
                return self.denied(req, reason, remaining, now);
            }
        }

        // ── Stage 5: field visibility (read/list with data only) ─────────────
        let filtered_data = match (&req.action, &req.resource_data) {
            (Action::Read | Action::List, Some(data)) => Some(match data {
                serde_json::Value::Array(items) => serde_json::Value::Array(
                    self.fields.filter_batch(req.role, req.resource, items),
                ),
                other => self.fields.filter_record(req.role, req.resource, other),
            }),
            // No filter stage ran: echo the input.
            (_, data) => data.clone(),
        };

        debug!(
            role = %req.role,
            resource = %req.resource,
            action = %req.action,
            remaining = ?remaining,
            "access allowed"
        );

        AccessDecision {
            decision_id: DecisionId::new(),
            allowed: true,
            reason: None,
            filtered_data,
            remaining,
            decided_at: now,
        }
    }

    fn denied(
        &self,
        req: &AccessRequest,
        reason: String,
        remaining: Option<u32>,
        now: DateTime<Utc>,
    ) -> AccessDecision {
        warn!(
            role = %req.role,
            resource = %req.resource,
            action = %req.action,
            user_id = %req.user_id,
            reason = %reason,
            "access denied"
        );

        AccessDecision {
            decision_id: DecisionId::new(),
            allowed: false,
            reason: Some(reason),
            filtered_data: None,
            remaining,
            decided_at: now,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
