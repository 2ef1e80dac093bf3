//! Flattening: merge validated customer documents into one canonical,
//! backend-ready table of groups, approles, and policies.
//!
//! Capability sets are unioned when the same policy/path pair is contributed
//! more than once, across documents and across the groups synthesized by the
//! accessor linker. Consumers must not depend on iteration order, only on
//! set membership.

use crate::policy::{Capability, Conventions, CustomerConfig, PolicyRule, TargetKind};
use std::collections::{BTreeMap, BTreeSet};

/// A policy body: path → set of capabilities granted on it.
pub type PathCapabilities = BTreeMap<String, BTreeSet<Capability>>;

/// The canonical merge of every customer document, ready for application.
///
/// Owns its data outright; no back-references into the source documents.
#[derive(Debug, Default)]
pub struct FlattenedConfig {
    /// Group name → policy name (`group-<prefix>-<group-name>`)
    pub groups: BTreeMap<String, String>,

    /// AppRole name → policy name (`approle-<approle-name>`)
    pub approles: BTreeMap<String, String>,

    /// Policy name → policy body
    pub policies: BTreeMap<String, PathCapabilities>,

    /// Every distinct path referenced by any rule. Collected for secret-path
    /// placeholder provisioning, which is not implemented yet.
    pub paths: BTreeSet<String>,
}

/// Give every accessor group the two rules it needs to administer its
/// approle's credentials, and inject it into the owning document.
///
/// The synthesized rules REPLACE the placeholder's policy list; when one
/// group name is referenced by several approles, each reference contributes
/// its own group entry and the union in [`flatten`] recovers all of them.
/// Do not "fix" the replacement into a local merge without revisiting that
/// interplay.
pub fn link_accessor_groups(configs: &mut [CustomerConfig]) {
    for config in configs.iter_mut() {
        let mut linked = Vec::new();
        for approle in &config.approles {
            for accessor in &approle.accessor_groups {
                let mut group = accessor.clone();
                group.policies = vec![
                    PolicyRule::synthetic(
                        format!("auth/approle/role/{}/role-id", approle.name),
                        [Capability::Read],
                    ),
                    PolicyRule::synthetic(
                        format!("auth/approle/role/{}/secret-id", approle.name),
                        [Capability::Create, Capability::Update],
                    ),
                ];
                linked.push(group);
            }
        }
        config.groups.append(&mut linked);
    }
}

/// Merge an ordered list of customer configs into one [`FlattenedConfig`].
///
/// Runs the accessor linker first, then builds the name→policy-name tables
/// and unions each contributed rule's capabilities into the policy body.
pub fn flatten(mut configs: Vec<CustomerConfig>, conventions: &Conventions) -> FlattenedConfig {
    link_accessor_groups(&mut configs);

    let mut flat = FlattenedConfig::default();

    for config in &configs {
        for group in &config.groups {
            let policy_name = policy_name(TargetKind::Group, &group.name, conventions);
            flat.groups.insert(group.name.clone(), policy_name.clone());
            merge_rules(&mut flat, policy_name, &group.policies);
        }
        for approle in &config.approles {
            let policy_name = policy_name(TargetKind::AppRole, &approle.name, conventions);
            flat.approles
                .insert(approle.name.clone(), policy_name.clone());
            merge_rules(&mut flat, policy_name, &approle.policies);
        }
    }

    flat
}

/// Canonical policy name for a target. Approle names already carry the
/// customer prefix by construction, group names get it inserted.
fn policy_name(kind: TargetKind, name: &str, conventions: &Conventions) -> String {
    match kind {
        TargetKind::Group => format!(
            "{}-{}-{}",
            kind.label(),
            conventions.customer_prefix,
            name
        ),
        TargetKind::AppRole => format!("{}-{}", kind.label(), name),
    }
}

fn merge_rules(flat: &mut FlattenedConfig, policy_name: String, rules: &[PolicyRule]) {
    // A target with no rules still claims its (empty) policy
    let policy = flat.policies.entry(policy_name).or_default();
    for rule in rules {
        flat.paths.insert(rule.path.clone());
        policy
            .entry(rule.path.clone())
            .or_default()
            .extend(rule.capabilities.iter().copied());
    }
}
