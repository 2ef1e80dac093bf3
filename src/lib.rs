//! Self-service Vault ACL provisioning
//!
//! Turns declarative per-customer access-control documents into the concrete
//! group/role/policy objects understood by a HashiCorp Vault KV-v2 backend,
//! and applies them idempotently.
//!
//! ## Pipeline
//!
//! ```text
//! *.yml documents → parser → [CustomerConfig] → accessor linker
//!                 → flattener → FlattenedConfig → KV-v2 expansion → Vault
//! ```
//!
//! - Documents grant capabilities on abstract paths under a mandatory
//!   customer prefix; names and paths are validated against strict
//!   conventions with layered, customer-facing error messages.
//! - Multiple documents are merged into one canonical table, unioning
//!   capability sets when the same policy/path pair is contributed twice.
//! - Each abstract capability is rewritten into Vault's irregular KV-v2
//!   sub-path capability set before being pushed.
//!
//! ## Example document
//!
//! ```yaml
//! groups:
//!   - name: customer-prod-reader
//!     policies:
//!       - path: customer/prod/*
//!         capabilities: [read, list]
//! approles:
//!   - name: customer-application-prod
//!     policies:
//!       - path: customer/prod/application/*
//!         capabilities: [read]
//!     accessor_groups: [customer-prod-admin]
//! ```

pub mod config;
pub mod error;
pub mod flatten;
pub mod policy;
pub mod vault;

// Re-export main types
pub use config::{AppConfig, load_config};
pub use error::{AppError, ParseReport, Result, ValidationError, ValidationKind};
pub use flatten::{FlattenedConfig, flatten};
pub use policy::{Capability, Conventions, CustomerConfig};
pub use vault::VaultClient;
