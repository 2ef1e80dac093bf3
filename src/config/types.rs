//! Configuration types for vault-selfserve
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Vault connection settings
    pub vault: VaultConfig,

    /// Customer convention settings
    pub customer: CustomerSettings,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Vault connection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Vault server URL (e.g. `https://vault.example.com:8200`)
    pub url: String,

    /// Vault token (prefer env var VAULT_TOKEN)
    #[serde(default)]
    pub token: Option<String>,

    /// AppRole role id, used when the token is absent or rejected
    #[serde(default)]
    pub role_id: Option<String>,

    /// AppRole secret id
    #[serde(default)]
    pub role_secret: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Whether to verify SSL certificates
    pub verify_ssl: bool,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: None,
            role_id: None,
            role_secret: None,
            timeout_secs: 30,
            verify_ssl: true,
        }
    }
}

impl VaultConfig {
    /// Get the full API base URL
    pub fn api_url(&self) -> String {
        format!("{}/v1", self.url.trim_end_matches('/'))
    }
}

/// Customer convention configuration
///
/// The prefix scopes all of one customer's policy paths and approle names;
/// every validation rule in [`crate::policy`] is parameterized by it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CustomerSettings {
    /// Mandatory root path segment for customer paths and approle names
    pub prefix: String,

    /// Directory scanned for customer `*.yml`/`*.yaml` documents
    pub config_dir: String,

    /// Case-insensitive prefix group names may not start with (empty = off)
    pub invalid_group_prefix: String,

    /// Stop after validating documents instead of applying them
    pub only_validate: bool,
}

impl Default for CustomerSettings {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            config_dir: "/customer_configs".to_string(),
            invalid_group_prefix: String::new(),
            only_validate: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}
