//! Field sensitivity classification.
//!
//! A `FieldRule` gates one field of one resource behind a set of roles.
//! Fields without a rule are unrestricted — visible to every role. The
//! visibility filter never adds fields, only removes them.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::principal::Role;
use crate::resource::Resource;

/// How confidential a field is.
///
/// The level itself does not drive filtering — `allowed_roles` does — but it
/// is kept in configuration and exposed via queries so reporting surfaces can
/// badge fields appropriately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sensitivity {
    /// Visible to everyone; the default for unconfigured fields.
    Public,
    /// Internal operational data.
    Internal,
    /// Commercially sensitive data.
    Confidential,
    /// The tightest class, e.g. financial-bureau data.
    Restricted,
}

impl Sensitivity {
    /// The configuration token.
    pub fn as_str(self) -> &'static str {
        match self {
            Sensitivity::Public => "public",
            Sensitivity::Internal => "internal",
            Sensitivity::Confidential => "confidential",
            Sensitivity::Restricted => "restricted",
        }
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sensitivity classification for one (resource, field) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRule {
    pub resource: Resource,
    /// Field name as it appears in the resource's JSON records.
    pub field: String,
    pub sensitivity: Sensitivity,
    /// Roles that may see this field in outbound data.
    pub allowed_roles: HashSet<Role>,
}
