//! Self-service Vault ACL provisioner
//!
//! Parses a directory of customer documents, validates them against the
//! configured conventions, and (unless running validation-only) flattens and
//! applies them to a Vault server.

use clap::Parser;
use std::path::Path;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use vault_selfserve::{
    config::{LogFormat, load_config},
    flatten::flatten,
    policy::{Conventions, find_document_files, parse_files},
    vault::{VaultClient, apply_flat_config},
};

/// Apply customer-defined Vault ACL documents to a Vault server
#[derive(Parser, Debug)]
#[command(name = "vault-selfserve")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "VAULT_SELFSERVE_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "VAULT_SELFSERVE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Directory of customer documents (overrides customer.config_dir)
    #[arg(long)]
    customer_dir: Option<String>,

    /// Apply the documents instead of only validating them
    #[arg(long)]
    apply: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let config = load_config(args.config.as_deref())
        .inspect_err(|e| eprintln!("Failed to load configuration: {e}"))?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let fmt_layer = fmt::layer().with_writer(std::io::stderr);
    match config.logging.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt_layer.json())
            .with(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry().with(fmt_layer).with(filter).init(),
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        customer = %config.customer.prefix,
        "Starting Vault self-service run"
    );

    let conventions = Conventions::from(&config.customer);
    let config_dir = args
        .customer_dir
        .as_deref()
        .unwrap_or(&config.customer.config_dir);

    debug!(dir = %config_dir, "Scanning customer config dir");
    let files = find_document_files(Path::new(config_dir))
        .inspect_err(|e| error!(error = %e, dir = %config_dir, "Failed to scan customer dir"))?;
    debug!(count = files.len(), "Found customer documents");

    let configs = match parse_files(&files, &conventions) {
        Ok(configs) => configs,
        Err(report) => {
            error!("{report}");
            anyhow::bail!("{} document(s) failed validation", report.errors.len());
        }
    };

    let only_validate = config.customer.only_validate && !args.apply;
    if only_validate {
        info!("Validation complete");
        return Ok(());
    }

    info!("Validation-only mode disabled, applying configs");
    let flat = flatten(configs, &conventions);

    let client = VaultClient::new(&config.vault)
        .inspect_err(|e| error!(error = %e, "Failed to create Vault client"))?;
    client
        .authenticate(&config.vault)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to authenticate with Vault"))?;
    debug!(server = %config.vault.url, "Authenticated with Vault server");

    if !apply_flat_config(&client, &flat).await {
        anyhow::bail!("failed to apply one or more targets");
    }

    info!("All targets applied");
    Ok(())
}
