//! Principal types: the acting user's role and identity.
//!
//! Roles form a closed, process-wide constant set. The engine never learns
//! roles at runtime — the surrounding middleware authenticates the request
//! and hands the engine a `Role` plus a `UserId`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuthzError;

/// The closed set of roles known to the engine.
///
/// Serialized in kebab-case both in JSON decisions and in TOML policy tables:
/// `"admin"`, `"manager"`, `"rep"`, `"content-editor"`, `"viewer"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Full administrative access; owns every resource instance.
    Admin,
    /// Team lead; owns every resource instance within reach of their grants.
    Manager,
    /// Sales representative; scoped to resources they own or are assigned.
    Rep,
    /// Maintains knowledge-base articles and templates.
    ContentEditor,
    /// Read-only access to unrestricted fields.
    Viewer,
}

impl Role {
    /// All roles, in a fixed order. Useful for building sensitivity tables.
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Manager,
        Role::Rep,
        Role::ContentEditor,
        Role::Viewer,
    ];

    /// The kebab-case token used in configuration and log output.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Rep => "rep",
            Role::ContentEditor => "content-editor",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| AuthzError::ParseError {
                kind: "role",
                value: s.to_string(),
            })
    }
}

/// The acting principal's identifier.
///
/// Opaque to the engine: hosts use numeric ids ("5"), UUIDs, or tenant-scoped
/// tokens. Placeholder substitution in condition rules is the only place the
/// engine inspects the contents (see `lattice-conditions`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Construct a user id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
