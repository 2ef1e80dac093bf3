//! Policy targets: the entities a policy can be applied to.
//!
//! Groups and approles share the same validation shape (check the name,
//! then each policy rule in order) parameterized by per-variant constants:
//! the kind label, the allowed-name pattern, and its human explanation.

use crate::error::{ValidationError, ValidationKind};
use crate::policy::{Conventions, PolicyRule, RawRule, ordinal};
use regex::Regex;
use std::sync::LazyLock;

// At least one of a-z, A-Z, 0-9, _, space, or -, not all spaces
static GROUP_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ ]*[\w\-]+[\w\- ]*$").expect("hard-coded pattern"));

// At least one of a-z, A-Z, 0-9, _ or -
static APPROLE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\-]+$").expect("hard-coded pattern"));

/// The two kinds of policy target, with their per-variant naming rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Group,
    AppRole,
}

impl TargetKind {
    /// Kind label used in policy names and error messages.
    pub fn label(self) -> &'static str {
        match self {
            TargetKind::Group => "group",
            TargetKind::AppRole => "approle",
        }
    }

    fn name_pattern(self) -> &'static Regex {
        match self {
            TargetKind::Group => &GROUP_NAME,
            TargetKind::AppRole => &APPROLE_NAME,
        }
    }

    fn name_explanation(self) -> &'static str {
        match self {
            TargetKind::Group => "group names must only contain a-z, A-Z, 0-9, _, space, or -",
            TargetKind::AppRole => "approle names must only contain a-z, A-Z, 0-9, _, or -",
        }
    }
}

/// Validate a target name against its kind's pattern.
fn validate_name(kind: TargetKind, name: Option<&str>) -> Result<String, ValidationError> {
    let name = match name {
        Some(name) if !name.is_empty() => name,
        _ => return Err(ValidationKind::NameRequired { kind: kind.label() }.into()),
    };

    if !kind.name_pattern().is_match(name) {
        return Err(ValidationKind::InvalidName {
            explanation: kind.name_explanation(),
            kind: kind.label(),
            name: name.to_string(),
        }
        .into());
    }

    Ok(name.to_string())
}

/// Validate each raw rule in order, wrapping failures with the 1-based
/// policy ordinal.
fn parse_rules(
    raw_rules: &[RawRule],
    conventions: &Conventions,
) -> Result<Vec<PolicyRule>, ValidationError> {
    raw_rules
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            PolicyRule::parse(&raw.path, raw.capabilities.as_deref(), conventions)
                .map_err(|e| e.wrap(format!("error in {} policy", ordinal(i + 1))))
        })
        .collect()
}

/// An identity-provider-backed (LDAP) group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub policies: Vec<PolicyRule>,
}

impl Group {
    /// Validate a raw group definition.
    ///
    /// An empty policy list is allowed: pushing a group with no rules
    /// revokes previously granted permissions.
    pub fn parse(
        name: Option<&str>,
        policies: &[RawRule],
        conventions: &Conventions,
    ) -> Result<Self, ValidationError> {
        let name = validate_name(TargetKind::Group, name)?;
        let policies = parse_rules(policies, conventions)?;

        let forbidden = &conventions.invalid_group_prefix;
        if !forbidden.is_empty()
            && name.to_lowercase().starts_with(&forbidden.to_lowercase())
        {
            return Err(ValidationKind::ForbiddenGroupPrefix {
                prefix: forbidden.clone(),
                name,
            }
            .into());
        }

        Ok(Self { name, policies })
    }

    /// A bare placeholder for an accessor-group reference. Name validation
    /// is deferred; the accessor linker assigns the policies later.
    pub(crate) fn placeholder(name: &str) -> Self {
        Self {
            name: name.to_string(),
            policies: Vec::new(),
        }
    }
}

/// A machine-identity approle, optionally administered by accessor groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppRole {
    pub name: String,
    pub policies: Vec<PolicyRule>,
    /// Groups granted credential access to this approle. Captured as bare
    /// placeholders; resolved by the accessor linker after parsing.
    pub accessor_groups: Vec<Group>,
}

impl AppRole {
    /// Validate a raw approle definition.
    pub fn parse(
        name: Option<&str>,
        policies: &[RawRule],
        accessor_groups: &[String],
        conventions: &Conventions,
    ) -> Result<Self, ValidationError> {
        let name = validate_name(TargetKind::AppRole, name)?;
        let policies = parse_rules(policies, conventions)?;

        let prefix = conventions.approle_prefix();
        if !name.starts_with(&prefix) {
            return Err(ValidationKind::ApprolePrefixMissing { prefix, name }.into());
        }

        let accessor_groups = accessor_groups
            .iter()
            .map(|g| Group::placeholder(g))
            .collect();

        Ok(Self {
            name,
            policies,
            accessor_groups,
        })
    }
}
