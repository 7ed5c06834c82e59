//! # lattice-policy
//!
//! The static, fail-closed role→resource→action permission matrix.
//!
//! ## Overview
//!
//! This crate provides [`PolicyMatrix`], which implements the
//! [`RoleMatrix`](lattice_core::traits::RoleMatrix) trait. Grants are
//! declared in code or in a TOML file and loaded once at startup; a
//! (role, resource) pair with no grant permits nothing, and a grant
//! containing `manage` permits everything for its pair.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use lattice_policy::PolicyMatrix;
//!
//! let matrix = PolicyMatrix::from_file(Path::new("policies/permissions.toml"))?;
//! // Pass `matrix` to `lattice_core::AccessGate::new(...)`.
//! ```

pub mod matrix;

pub use matrix::{MatrixConfig, PermissionGrant, PolicyMatrix};

// ── Tests ─────────────────────────────────────────────────────────────────────
