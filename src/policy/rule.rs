//! Policy rule validation
//!
//! A rule pairs one path with the capabilities granted on it. Paths are
//! validated section by section against the customer's conventions, and the
//! error picks the most specific explanation available so customers can fix
//! documents without guessing.

use crate::error::{ValidationError, ValidationKind};
use crate::policy::{Capability, Conventions};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Roots no customer may ever grant on, regardless of prefix.
pub(crate) const NEVER_ALLOWED_ROOTS: &[&str] = &["+", "sys", "auth"];

// At least one of a-z, A-Z, 0-9, _ or -
static WORD_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\-]+$").expect("hard-coded pattern"));

const SECTION_EXPLANATION: &str =
    "policy path sections may be a single +, or a combination of a-z, A-Z, 0-9, _, -";
const WILDCARD_EXPLANATION: &str = "'*' is only allowed as the last character in policy path";
const EMPTY_SECTION_EXPLANATION: &str =
    "please avoid leading `/foo`, trailing `foo/`, or double `foo//bar` slashes in policy path";

/// Whether a string is a plain word section (`[A-Za-z0-9_-]+`).
pub(crate) fn is_word_section(section: &str) -> bool {
    WORD_SECTION.is_match(section)
}

/// One path with the set of capabilities granted on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRule {
    pub path: String,
    pub capabilities: BTreeSet<Capability>,
}

impl PolicyRule {
    /// Validate one raw (path, capability-list) pair against the customer's
    /// conventions. Returns a validated rule or a descriptive error, never a
    /// partial value.
    pub fn parse(
        path: &str,
        capabilities: Option<&[String]>,
        conventions: &Conventions,
    ) -> Result<Self, ValidationError> {
        let caps = match capabilities {
            Some(caps) if !caps.is_empty() => caps,
            _ => {
                return Err(ValidationKind::NoCapabilities {
                    path: path.to_string(),
                }
                .into());
            }
        };

        // * is allowed, but only as the last character, per Vault's policy
        // syntax. Rather than special-case the last section, remove a
        // trailing *, if it exists, before validating sections. Don't leave
        // a trailing slash behind if the path ends with /*.
        let mut path_to_verify = path;
        if let Some(stripped) = path_to_verify.strip_suffix('*') {
            path_to_verify = stripped.strip_suffix('/').unwrap_or(stripped);
        }

        let sections: Vec<&str> = path_to_verify.split('/').collect();
        let root = sections[0];
        if NEVER_ALLOWED_ROOTS.contains(&root) {
            return Err(ValidationKind::ReservedRoot {
                root: root.to_string(),
                path: path.to_string(),
            }
            .into());
        }
        if root != conventions.customer_prefix {
            return Err(ValidationKind::ForeignRoot {
                prefix: conventions.customer_prefix.clone(),
                root: root.to_string(),
                path: path.to_string(),
            }
            .into());
        }

        for section in &sections {
            if *section == "+" || is_word_section(section) {
                continue;
            }
            let explanation = if section.is_empty() {
                EMPTY_SECTION_EXPLANATION
            } else if section.contains('*') {
                WILDCARD_EXPLANATION
            } else {
                SECTION_EXPLANATION
            };
            return Err(ValidationKind::InvalidSection {
                explanation,
                section: section.to_string(),
                path: path.to_string(),
            }
            .into());
        }

        let capabilities = caps
            .iter()
            .map(|cap| Capability::parse(cap))
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Self {
            path: path.to_string(),
            capabilities,
        })
    }

    /// Build a rule without validation. Reserved for backend-internal paths
    /// (approle auth paths) that are well-formed by construction.
    pub(crate) fn synthetic(
        path: impl Into<String>,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Self {
        Self {
            path: path.into(),
            capabilities: capabilities.into_iter().collect(),
        }
    }
}
