//! # lattice-core
//!
//! The layered decision pipeline for the lattice authorization engine.
//!
//! This crate provides:
//! - The five core traits (`RoleMatrix`, `ActionLimiter`, `ConditionGate`,
//!   `FieldFilter`, `CounterStore`)
//! - The `OwnershipResolver`
//! - The `AccessGate` that wires the layers together in the fixed
//!   evaluation order
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lattice_core::{AccessGate, traits::{RoleMatrix, ActionLimiter, ConditionGate, FieldFilter}};
//! ```

pub mod gate;
pub mod ownership;
pub mod traits;

pub use gate::AccessGate;
pub use ownership::OwnershipResolver;
