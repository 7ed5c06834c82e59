//! Core trait definitions for the lattice decision pipeline.
//!
//! These traits are the seams between the pipeline and its layers:
//!
//! - `RoleMatrix`    — coarse role→resource→action permission lookup
//! - `ActionLimiter` — rate/quota/field-write/precondition restrictions
//! - `ConditionGate` — predicate rules over the resource's current data
//! - `FieldFilter`   — per-field visibility projection for outbound data
//! - `CounterStore`  — time-windowed counters backing rate limits and quotas
//!
//! The pipeline composes boxed implementations in a fixed order and
//! short-circuits on the first denial. Every implementation must be pure
//! in-memory computation; none of these calls may block or perform I/O.

use chrono::{DateTime, Duration, Utc};

use lattice_contracts::{
    principal::{Role, UserId},
    request::{AccessRequest, CheckOutcome},
    resource::{Action, Resource},
    restriction::{CounterKey, CounterVerdict},
};

/// The coarse permission gate: does this role hold this action on this
/// resource at all?
///
/// Implementations must be fail-closed — an unknown (role, resource) pair is
/// a `false`, never a default-allow — and must honor the `Manage` wildcard.
pub trait RoleMatrix: Send + Sync {
    /// Return true if `role` may perform `action` on `resource`.
    fn allows(&self, role: Role, resource: Resource, action: Action) -> bool;
}

/// The restriction layer: constraints on the operation itself.
///
/// `now` is threaded in by the pipeline so window arithmetic is testable
/// without waiting out real time.
pub trait ActionLimiter: Send + Sync {
    /// Check every restriction configured for the request's triple.
    ///
    /// No configured restriction means allow. All restrictions must pass;
    /// the first failure short-circuits with its reason. A passing check may
    /// carry `remaining` when a rate or quota counter was consulted.
    fn check(&self, req: &AccessRequest, now: DateTime<Utc>) -> CheckOutcome;
}

/// The condition layer: predicate rules over the resource's current data.
pub trait ConditionGate: Send + Sync {
    /// Evaluate every condition config matching the triple against `data`.
    ///
    /// No matching config means allow. With matching configs, `data` must be
    /// a JSON object or the evaluation fails closed. Rules run in
    /// declaration order; the first failing rule supplies the denial reason.
    fn evaluate(
        &self,
        role: Role,
        resource: Resource,
        action: Action,
        data: Option<&serde_json::Value>,
        user_id: &UserId,
    ) -> CheckOutcome;
}

/// The visibility layer: projects outbound records down to the fields a role
/// may see.
///
/// Filtering is a pure projection — output keys are always a subset of input
/// keys, inputs are never mutated, and non-object input yields an empty
/// result rather than an error.
pub trait FieldFilter: Send + Sync {
    /// Return true if `role` may see `field` of `resource`.
    /// Unconfigured fields are unrestricted.
    fn can_access_field(&self, role: Role, resource: Resource, field: &str) -> bool;

    /// Project one record down to the accessible fields.
    fn filter_record(
        &self,
        role: Role,
        resource: Resource,
        record: &serde_json::Value,
    ) -> serde_json::Value;

    /// Project a batch of records. Element order is preserved.
    fn filter_batch(
        &self,
        role: Role,
        resource: Resource,
        records: &[serde_json::Value],
    ) -> Vec<serde_json::Value>;
}

/// The counter store backing rate limits and quotas.
///
/// One logical operation: increment-or-reset-with-window. Implementations
/// must serialize mutation per key so concurrent hits from the same
/// principal never lose updates. The in-memory implementation lives in
/// `lattice-limits`; a horizontally scaled host substitutes a shared store
/// without touching restriction logic.
pub trait CounterStore: Send + Sync {
    /// Record one hit against `key`.
    ///
    /// On first use, or when `now` is at least `window` past the counter's
    /// window start, the counter resets to 1 and the hit is admitted with
    /// `limit - 1` remaining. At capacity the hit is rejected with the
    /// seconds until the window resets. Otherwise the counter increments and
    /// the hit is admitted with `limit - count` remaining.
    fn hit(
        &self,
        key: &CounterKey,
        limit: u32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> CounterVerdict;
}
