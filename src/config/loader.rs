//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `etherswap.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    networks = config.networks.len(),
    artifacts = %config.app.artifacts_dir,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig =
    toml::from_str(content).with_context(|| "Failed to parse configuration TOML")?;

  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - At least one network, each with an http(s) RPC URL
/// - Positive receipt poll interval
/// - Parsable external and swap contract addresses
/// - Sensible token parameters
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.networks.is_empty(),
    "At least one network must be configured"
  );

  for (name, network) in &config.networks {
    anyhow::ensure!(
      network.rpc_url.starts_with("http://") || network.rpc_url.starts_with("https://"),
      "Network {name} rpc_url must be an http(s) URL, got '{}'",
      network.rpc_url
    );
    anyhow::ensure!(
      network.receipt_poll_ms > 0,
      "Network {name} receipt_poll_ms must be positive"
    );

    for (field, value) in [
      ("moc_address", &network.moc_address),
      ("doc_address", &network.doc_address),
    ] {
      if let Some(addr) = value {
        addr
          .parse::<Address>()
          .with_context(|| format!("Network {name} has invalid {field}: {addr}"))?;
      }
    }
  }

  anyhow::ensure!(
    config.deploy.token_decimals <= 36,
    "token_decimals must be at most 36, got {}",
    config.deploy.token_decimals
  );
  anyhow::ensure!(
    config.deploy.token_supply > 0,
    "token_supply must be positive"
  );

  config.swap.contract_address()?;

  anyhow::ensure!(
    !config.app.artifacts_dir.is_empty(),
    "artifacts_dir must not be empty"
  );

  Ok(())
}
