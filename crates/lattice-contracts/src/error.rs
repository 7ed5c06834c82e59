//! Error types for the lattice authorization engine.
//!
//! Denials are NOT errors: a denied action is a normal `AccessDecision` with
//! `allowed = false`. Only malformed static configuration and unparsable
//! tokens surface as `AuthzError`, and those should be caught once at process
//! start, never per request.

use thiserror::Error;

/// The unified error type for the lattice crates.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// A static policy table is malformed: bad TOML, an unparsable window or
    /// period string, an unknown placeholder token, or an empty action set.
    ///
    /// Treated as fatal at configuration-load time.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A role, resource, or action token could not be parsed.
    ///
    /// Produced by the `FromStr` impls used at the CLI surface.
    #[error("invalid {kind} token: '{value}'")]
    ParseError { kind: &'static str, value: String },
}

/// Convenience alias used throughout the lattice crates.
pub type AuthzResult<T> = Result<T, AuthzError>;
