//! Vault backend: KV-v2 capability expansion, HTTP client, and the applier
//! that pushes a flattened configuration to a running server.

mod apply;
mod client;
mod expand;

pub use apply::apply_flat_config;
pub use client::VaultClient;
pub use expand::expand_kv_v2;
