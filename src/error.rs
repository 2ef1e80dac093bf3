//! Error types for vault-selfserve
//!
//! This module defines the error hierarchy used throughout the application.
//! Validation failures carry a stack of context frames (capability → policy
//! ordinal → target → document) that is rendered to one flat message at the
//! boundary, so tests can assert on structure instead of substrings.

use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Parse(#[from] ParseReport),

    #[error("Vault API error: {0}")]
    Vault(#[from] VaultError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The specific reason a document, target, rule, or capability was rejected.
///
/// Messages quote the offending value and, for path failures, the full path,
/// so a customer can locate the problem without opening the file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationKind {
    #[error("policy path '{path}' does not have any capabilities")]
    NoCapabilities { path: String },

    #[error("illegal root '{root}' in path '{path}'")]
    ReservedRoot { root: String, path: String },

    #[error("all policy paths must be children of '{prefix}': illegal root '{root}' in path '{path}'")]
    ForeignRoot {
        prefix: String,
        root: String,
        path: String,
    },

    #[error("{explanation}: invalid section '{section}' in path '{path}'")]
    InvalidSection {
        explanation: &'static str,
        section: String,
        path: String,
    },

    #[error("'{value}' is not a valid capability")]
    UnknownCapability { value: String },

    #[error("name required for {kind}")]
    NameRequired { kind: &'static str },

    #[error("{explanation}: invalid {kind} name '{name}'")]
    InvalidName {
        explanation: &'static str,
        kind: &'static str,
        name: String,
    },

    #[error("group name must not start with '{prefix}': {name}")]
    ForbiddenGroupPrefix { prefix: String, name: String },

    #[error("approle name must start with '{prefix}': {name}")]
    ApprolePrefixMissing { prefix: String, name: String },

    #[error("malformed document: {0}")]
    Malformed(String),
}

/// A validation failure plus the chain of context frames leading to it.
///
/// Frames are stored outermost-first ("error parsing 'x.yml'",
/// "group 'ops'", "error in 1st policy") and joined with `: ` on display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    frames: Vec<String>,
    kind: ValidationKind,
}

impl ValidationError {
    pub fn new(kind: ValidationKind) -> Self {
        Self {
            frames: Vec::new(),
            kind,
        }
    }

    /// Add an outer context frame, e.g. `group 'ops'`.
    #[must_use]
    pub fn wrap(mut self, frame: impl Into<String>) -> Self {
        self.frames.insert(0, frame.into());
        self
    }

    pub fn kind(&self) -> &ValidationKind {
        &self.kind
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for frame in &self.frames {
            write!(f, "{frame}: ")?;
        }
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationKind> for ValidationError {
    fn from(kind: ValidationKind) -> Self {
        Self::new(kind)
    }
}

/// Aggregate of per-document validation failures.
///
/// Parsing never fail-fasts across documents: a caller sees every broken
/// file in one report.
#[derive(Debug)]
pub struct ParseReport {
    pub errors: Vec<ValidationError>,
}

impl std::fmt::Display for ParseReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "error(s) parsing customer configs:")?;
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f, "-----------")?;
            }
            writeln!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseReport {}

/// Vault API specific errors
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Vault API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unauthorized: invalid or expired token")]
    Unauthorized,

    #[error("No token and no approle credentials configured")]
    NoCredentials,

    #[error("Invalid response from Vault: {0}")]
    InvalidResponse(String),
}

impl VaultError {
    /// Create an appropriate error from an HTTP status code and response body
    pub fn from_response(status: u16, body: &str) -> Self {
        match status {
            401 => VaultError::Unauthorized,
            _ => VaultError::Api {
                status,
                message: if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body.to_string()
                },
            },
        }
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for Vault API operations
pub type VaultResult<T> = std::result::Result<T, VaultError>;
