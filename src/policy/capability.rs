//! The closed set of capability verbs customers may grant on a path.

use crate::error::{ValidationError, ValidationKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A Vault policy capability.
///
/// `sudo` is deliberately absent: customers must never be able to grant it,
/// so it fails validation like any other unknown string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Create,
    Read,
    Update,
    Delete,
    List,
    Deny,
}

impl Capability {
    /// The wire spelling understood by Vault's ACL evaluator.
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Create => "create",
            Capability::Read => "read",
            Capability::Update => "update",
            Capability::Delete => "delete",
            Capability::List => "list",
            Capability::Deny => "deny",
        }
    }

    /// Resolve a raw capability string, rejecting anything outside the set.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "create" => Ok(Capability::Create),
            "read" => Ok(Capability::Read),
            "update" => Ok(Capability::Update),
            "delete" => Ok(Capability::Delete),
            "list" => Ok(Capability::List),
            "deny" => Ok(Capability::Deny),
            _ => Err(ValidationKind::UnknownCapability {
                value: value.to_string(),
            }
            .into()),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
