//! KV-v2 capability expansion
//!
//! A capability on a logical secret path (what you would put in a GET
//! request) only takes effect in Vault's KV-v2 ACL model as capabilities on
//! several physical sub-paths (data/metadata/delete/destroy/undelete). This
//! module rewrites each abstract path→capability entry into that literal
//! form, e.g.
//!
//! ```text
//! read @ customer/foo/*  →  read @ customer/data/foo/*
//! list @ customer/foo/*  →  list @ customer/metadata/foo/*
//!                        +  read @ customer/metadata/foo/*
//! ```
//!
//! The expansion table is a wire contract with Vault's ACL evaluator and
//! must not be approximated.

use crate::flatten::PathCapabilities;
use crate::policy::Capability;

/// Roots that are not KV mounts and pass through unexpanded.
const NON_KV_ROOTS: &[&str] = &["auth", "sys"];

/// The fixed (sub-path, resulting capability) fan-out per input capability.
fn expansions(capability: Capability) -> &'static [(&'static str, Capability)] {
    use Capability::*;
    match capability {
        Create => &[("data", Create)],
        Read => &[("data", Read)],
        Update => &[("data", Update)],
        Delete => &[
            ("data", Delete),
            ("delete", Update),
            ("destroy", Update),
            ("undelete", Update),
            ("metadata", Delete),
        ],
        List => &[("metadata", List), ("metadata", Read)],
        Deny => &[("data", Deny)],
    }
}

/// Rewrite one policy body into Vault's literal KV-v2 sub-path form.
///
/// System (`auth`/`sys`) paths pass through unchanged. For everything else
/// the sub-path is inserted as the second section, right after the root, and
/// all resulting capabilities for the same new path are unioned.
pub fn expand_kv_v2(policy: &PathCapabilities) -> PathCapabilities {
    let mut expanded = PathCapabilities::new();

    for (path, capabilities) in policy {
        let sections: Vec<&str> = path.split('/').collect();

        if NON_KV_ROOTS.contains(&sections[0]) {
            expanded.insert(path.clone(), capabilities.clone());
            continue;
        }

        for capability in capabilities {
            for (sub_path, new_capability) in expansions(*capability) {
                // customer/foo/* → customer/<sub_path>/foo/*
                let mut new_sections = sections.clone();
                new_sections.insert(1, sub_path);
                expanded
                    .entry(new_sections.join("/"))
                    .or_default()
                    .insert(*new_capability);
            }
        }
    }

    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn policy(entries: &[(&str, &[Capability])]) -> PathCapabilities {
        entries
            .iter()
            .map(|(path, caps)| (path.to_string(), caps.iter().copied().collect()))
            .collect()
    }

    fn caps(caps: &[Capability]) -> BTreeSet<Capability> {
        caps.iter().copied().collect()
    }

    #[test]
    fn test_system_paths_pass_through() {
        use Capability::*;
        let input = policy(&[
            ("auth/approle/role/x/role-id", &[Read]),
            ("sys/health", &[Read, List]),
        ]);
        assert_eq!(expand_kv_v2(&input), input);
    }

    #[test]
    fn test_deny_expands_to_data_only() {
        use Capability::*;
        let out = expand_kv_v2(&policy(&[("customer/app/dev/*", &[Deny])]));
        assert_eq!(out.len(), 1);
        assert_eq!(out["customer/data/app/dev/*"], caps(&[Deny]));
    }

    #[test]
    fn test_delete_fans_out() {
        use Capability::*;
        let out = expand_kv_v2(&policy(&[("customer/app/*", &[Delete])]));
        assert_eq!(out["customer/data/app/*"], caps(&[Delete]));
        assert_eq!(out["customer/delete/app/*"], caps(&[Update]));
        assert_eq!(out["customer/destroy/app/*"], caps(&[Update]));
        assert_eq!(out["customer/undelete/app/*"], caps(&[Update]));
        assert_eq!(out["customer/metadata/app/*"], caps(&[Delete]));
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn test_list_contributes_metadata_read() {
        use Capability::*;
        let out = expand_kv_v2(&policy(&[("customer/app/*", &[List])]));
        assert_eq!(out["customer/metadata/app/*"], caps(&[List, Read]));
        assert_eq!(out.len(), 1);
    }
}
