//! Apply a flattened configuration to a running Vault server.

use crate::flatten::FlattenedConfig;
use crate::vault::client::VaultClient;
use crate::vault::expand::expand_kv_v2;
use tracing::{debug, error};

/// Push every group, approle, and policy to the server, in that category
/// order. A failed call is logged and recorded; the remaining targets are
/// still attempted. Returns whether every call succeeded.
pub async fn apply_flat_config(client: &VaultClient, flat: &FlattenedConfig) -> bool {
    let mut success = true;

    for (name, policy_name) in &flat.groups {
        debug!(group = %name, "applying group");
        if let Err(err) = client
            .create_or_update_group(name, std::slice::from_ref(policy_name))
            .await
        {
            error!(group = %name, error = %err, "failed to apply group");
            success = false;
        }
    }

    for (name, policy_name) in &flat.approles {
        debug!(approle = %name, "applying approle");
        if let Err(err) = client
            .create_or_update_approle(name, std::slice::from_ref(policy_name))
            .await
        {
            error!(approle = %name, error = %err, "failed to apply approle");
            success = false;
        }
    }

    for (name, policy) in &flat.policies {
        debug!(policy = %name, "applying policy");
        let expanded = expand_kv_v2(policy);
        if let Err(err) = client.create_or_update_policy(name, &expanded).await {
            error!(policy = %name, error = %err, "failed to apply policy");
            success = false;
        }
    }

    // flat.paths is collected for secret-path placeholder provisioning,
    // which is not implemented yet.

    success
}
