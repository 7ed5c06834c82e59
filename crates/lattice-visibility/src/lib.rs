//! # lattice-visibility
//!
//! Per-field sensitivity classification and outbound projection filtering.
//!
//! ## Overview
//!
//! This crate provides [`FieldPolicy`], which implements the
//! [`FieldFilter`](lattice_core::traits::FieldFilter) trait. Each
//! (resource, field) pair may carry a sensitivity entry gating it behind a
//! role set; fields without an entry are visible to every role. Filtering is
//! a pure projection — the output's key set is always a subset of the
//! input's.

pub mod policy;

pub use policy::{FieldPolicy, FieldTableConfig};

// ── Tests ─────────────────────────────────────────────────────────────────────
