//! # lattice-ref-crm
//!
//! The reference CRM policy pack: a complete, working set of permission,
//! condition, restriction, and sensitivity tables for a small multi-tenant
//! CRM, plus a one-call [`reference_gate`](tables::reference_gate) wiring
//! them into an `AccessGate`.
//!
//! Production hosts load their own TOML tables; this crate is the worked
//! example and the home of the end-to-end scenario tests.

pub mod tables;

pub use tables::{
    reference_conditions, reference_field_rules, reference_gate, reference_matrix,
    reference_restrictions,
};

// ── Scenario tests ────────────────────────────────────────────────────────────
