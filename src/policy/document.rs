//! Customer document parsing
//!
//! One YAML document per file, with optional `groups` and `approles` lists.
//! Validation fails fast within a document, wrapping each failure with the
//! offending item's name (or 1-based ordinal when the name itself is
//! missing) and, at the outermost layer, the file being parsed.

use crate::error::{ConfigError, ParseReport, ValidationError, ValidationKind};
use crate::policy::{AppRole, Conventions, Group, ordinal};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Raw document shape, straight off the wire.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawDocument {
    #[serde(default)]
    pub groups: Vec<RawGroup>,
    #[serde(default)]
    pub approles: Vec<RawAppRole>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawGroup {
    pub name: Option<String>,
    #[serde(default)]
    pub policies: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawAppRole {
    pub name: Option<String>,
    #[serde(default)]
    pub policies: Vec<RawRule>,
    #[serde(default)]
    pub accessor_groups: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRule {
    pub path: String,
    pub capabilities: Option<Vec<String>>,
}

/// One customer's validated configuration, from one document.
///
/// Immutable once parsed, except that the accessor linker later appends
/// synthesized accessor groups to `groups`.
#[derive(Debug, Clone, Default)]
pub struct CustomerConfig {
    pub groups: Vec<Group>,
    pub approles: Vec<AppRole>,
}

impl CustomerConfig {
    /// Validate a raw document. Fails fast at the first invalid item.
    pub fn from_raw(raw: &RawDocument, conventions: &Conventions) -> Result<Self, ValidationError> {
        let mut groups = Vec::with_capacity(raw.groups.len());
        for (i, grp) in raw.groups.iter().enumerate() {
            let group = Group::parse(grp.name.as_deref(), &grp.policies, conventions)
                .map_err(|e| e.wrap(item_frame("group", grp.name.as_deref(), i)))?;
            debug!(group = %group.name, "found group");
            groups.push(group);
        }

        let mut approles = Vec::with_capacity(raw.approles.len());
        for (i, apr) in raw.approles.iter().enumerate() {
            let approle = AppRole::parse(
                apr.name.as_deref(),
                &apr.policies,
                &apr.accessor_groups,
                conventions,
            )
            .map_err(|e| e.wrap(item_frame("approle", apr.name.as_deref(), i)))?;
            debug!(approle = %approle.name, "found approle");
            approles.push(approle);
        }

        Ok(Self { groups, approles })
    }
}

/// Context frame for a failing item: its name when parseable, else its
/// 1-based ordinal.
fn item_frame(kind: &str, name: Option<&str>, index: usize) -> String {
    match name {
        Some(name) => format!("{kind} '{name}'"),
        None => format!("{} {kind}", ordinal(index + 1)),
    }
}

/// Parse one document from a YAML string.
pub fn parse_str(contents: &str, conventions: &Conventions) -> Result<CustomerConfig, ValidationError> {
    let raw: RawDocument = serde_yaml::from_str(contents)
        .map_err(|e| ValidationKind::Malformed(e.to_string()))?;
    CustomerConfig::from_raw(&raw, conventions)
}

/// Parse a single document file into a [`CustomerConfig`].
pub fn parse_file(path: &Path, conventions: &Conventions) -> Result<CustomerConfig, ValidationError> {
    let wrap = |e: ValidationError| e.wrap(format!("error parsing '{}'", path.display()));

    let contents = std::fs::read_to_string(path)
        .map_err(|e| wrap(ValidationKind::Malformed(e.to_string()).into()))?;
    let config = parse_str(&contents, conventions).map_err(wrap)?;

    info!(file = %file_name(path), "document is valid");
    Ok(config)
}

/// Parse a list of document files, collecting every per-file error instead
/// of stopping at the first broken document.
pub fn parse_files(
    paths: &[PathBuf],
    conventions: &Conventions,
) -> Result<Vec<CustomerConfig>, ParseReport> {
    let mut configs = Vec::with_capacity(paths.len());
    let mut errors = Vec::new();
    for path in paths {
        match parse_file(path, conventions) {
            Ok(config) => configs.push(config),
            Err(err) => errors.push(err),
        }
    }
    if errors.is_empty() {
        Ok(configs)
    } else {
        Err(ParseReport { errors })
    }
}

/// Search a customer config dir for `.yml` and `.yaml` files, sorted for a
/// deterministic processing order.
pub fn find_document_files(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("yml") | Some("yaml") => files.push(path),
            _ => {}
        }
    }
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conventions() -> Conventions {
        Conventions::new("customer", "bad-group")
    }

    #[test]
    fn test_empty_document() {
        let config = parse_str("{}", &conventions()).unwrap();
        assert!(config.groups.is_empty());
        assert!(config.approles.is_empty());
    }

    #[test]
    fn test_both_keys_optional() {
        let config = parse_str(
            "groups:\n  - name: customer-ops\n    policies: []\n",
            &conventions(),
        )
        .unwrap();
        assert_eq!(config.groups.len(), 1);
        assert!(config.approles.is_empty());
    }

    #[test]
    fn test_error_uses_name_when_present() {
        let err = parse_str(
            "groups:\n  - name: customer-ops\n    policies:\n      - path: sys/x\n        capabilities: [read]\n",
            &conventions(),
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("group 'customer-ops': "));
        assert!(msg.contains("error in 1st policy"));
        assert!(msg.contains("illegal root 'sys' in path 'sys/x'"));
    }

    #[test]
    fn test_error_uses_ordinal_when_name_missing() {
        let err = parse_str(
            "approles:\n  - policies: []\n",
            &conventions(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "1st approle: name required for approle");
    }

    #[test]
    fn test_unparseable_yaml_is_malformed() {
        let err = parse_str("groups: [", &conventions()).unwrap_err();
        assert!(matches!(err.kind(), ValidationKind::Malformed(_)));
    }
}
