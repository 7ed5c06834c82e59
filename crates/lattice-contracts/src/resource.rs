//! Resource and action enumerations.
//!
//! Both sets are closed: the engine refuses to reason about entity types or
//! verbs it does not know. New resources and actions are added here, in one
//! place, and every `match` over them is exhaustively checked.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuthzError;

/// A business entity type the engine can authorize actions against.
///
/// The engine treats instances of these as opaque JSON field maps — it never
/// defines their schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    Customers,
    Proposals,
    Opportunities,
    KnowledgeBase,
    Templates,
    Users,
}

impl Resource {
    /// All resources, in a fixed order.
    pub const ALL: [Resource; 6] = [
        Resource::Customers,
        Resource::Proposals,
        Resource::Opportunities,
        Resource::KnowledgeBase,
        Resource::Templates,
        Resource::Users,
    ];

    /// The kebab-case token used in configuration and log output.
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Customers => "customers",
            Resource::Proposals => "proposals",
            Resource::Opportunities => "opportunities",
            Resource::KnowledgeBase => "knowledge-base",
            Resource::Templates => "templates",
            Resource::Users => "users",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| AuthzError::ParseError {
                kind: "resource",
                value: s.to_string(),
            })
    }
}

/// A verb a principal may perform against a resource.
///
/// `Manage` is the wildcard: a (role, resource) grant containing `Manage`
/// implies every other action for that pair. The permission matrix enforces
/// this invariant; nothing else in the engine special-cases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    List,
    Search,
    Export,
    Approve,
    Publish,
    Assign,
    Manage,
}

impl Action {
    /// All actions, in a fixed order.
    pub const ALL: [Action; 11] = [
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Delete,
        Action::List,
        Action::Search,
        Action::Export,
        Action::Approve,
        Action::Publish,
        Action::Assign,
        Action::Manage,
    ];

    /// The kebab-case token used in configuration and log output.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::List => "list",
            Action::Search => "search",
            Action::Export => "export",
            Action::Approve => "approve",
            Action::Publish => "publish",
            Action::Assign => "assign",
            Action::Manage => "manage",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| AuthzError::ParseError {
                kind: "action",
                value: s.to_string(),
            })
    }
}
