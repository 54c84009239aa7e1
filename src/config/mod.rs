//! Configuration Module - TOML-based Tool Configuration
//!
//! Loads and validates configuration from `etherswap.toml`. Network
//! endpoints, external contract addresses and deployment parameters live
//! here. Private keys never do: they come from `ETHERSWAP_PRIVATE_KEYS`.

pub mod loader;

use std::collections::BTreeMap;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::deployment::{self, DeployParams};

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Logging and filesystem layout.
  #[serde(default)]
  pub app: AppSection,
  /// Named networks (`regtest`, `testnet`, `mainnet`, ...).
  pub networks: BTreeMap<String, NetworkConfig>,
  /// Constructor parameters for the test tokens.
  #[serde(default)]
  pub deploy: DeployConfig,
  /// Defaults for the swap lifecycle commands.
  #[serde(default)]
  pub swap: SwapConfig,
}

/// Logging and filesystem layout.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Root of the compiled contract artifacts.
  #[serde(default = "default_artifacts_dir")]
  pub artifacts_dir: String,
  /// Directory for per-network deployment records.
  #[serde(default = "default_deployments_dir")]
  pub deployments_dir: String,
}

impl Default for AppSection {
  fn default() -> Self {
    Self {
      log_level: default_log_level(),
      artifacts_dir: default_artifacts_dir(),
      deployments_dir: default_deployments_dir(),
    }
  }
}

/// One JSON-RPC network.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
  /// HTTP JSON-RPC endpoint.
  pub rpc_url: String,
  /// Expected chain ID, checked at connect when set.
  pub chain_id: Option<u64>,
  /// Fixed gas price in wei; the node's price is used when unset.
  pub gas_price: Option<u64>,
  /// Delay between receipt polls (milliseconds).
  #[serde(default = "default_receipt_poll_ms")]
  pub receipt_poll_ms: u64,
  /// Give up waiting for a receipt after this many seconds (0 = never).
  #[serde(default = "default_receipt_timeout_secs")]
  pub receipt_timeout_secs: u64,
  /// Money on Chain contract (live networks).
  pub moc_address: Option<String>,
  /// DOC token contract (live networks).
  pub doc_address: Option<String>,
}

impl NetworkConfig {
  pub fn receipt_poll_interval(&self) -> Duration {
    Duration::from_millis(self.receipt_poll_ms)
  }

  pub fn receipt_timeout(&self) -> Option<Duration> {
    (self.receipt_timeout_secs > 0).then(|| Duration::from_secs(self.receipt_timeout_secs))
  }
}

/// Test token constructor parameters (local networks).
#[derive(Debug, Clone, Deserialize)]
pub struct DeployConfig {
  /// ERC20 test token supply in whole tokens.
  #[serde(default = "default_token_supply")]
  pub token_supply: u64,
  #[serde(default = "default_token_decimals")]
  pub token_decimals: u8,
  /// Dummy DOC mint fee in wei.
  #[serde(default = "default_mint_fee_wei")]
  pub mint_fee_wei: u64,
  /// Dummy DOC BTC price (RBTC to DOC ratio).
  #[serde(default = "default_btc_price")]
  pub btc_price: u64,
  /// Signer index that owns the dummy DOC token.
  #[serde(default = "default_doc_owner_index")]
  pub doc_owner_index: usize,
}

impl Default for DeployConfig {
  fn default() -> Self {
    Self {
      token_supply: default_token_supply(),
      token_decimals: default_token_decimals(),
      mint_fee_wei: default_mint_fee_wei(),
      btc_price: default_btc_price(),
      doc_owner_index: default_doc_owner_index(),
    }
  }
}

/// Defaults for the swap lifecycle commands.
#[derive(Debug, Clone, Deserialize)]
pub struct SwapConfig {
  /// EtherSwap address; falls back to the network's deployment record.
  pub contract_address: Option<String>,
  /// `version()` the contract must report.
  #[serde(default = "default_expected_version")]
  pub expected_version: u8,
  /// Blocks to wait on top of the inclusion block.
  #[serde(default = "default_confirmations")]
  pub confirmations: u64,
  /// Gas limit for claims; estimated by the node when unset.
  pub claim_gas_limit: Option<u64>,
}

impl Default for SwapConfig {
  fn default() -> Self {
    Self {
      contract_address: None,
      expected_version: default_expected_version(),
      confirmations: default_confirmations(),
      claim_gas_limit: None,
    }
  }
}

impl SwapConfig {
  pub fn contract_address(&self) -> Result<Option<Address>> {
    self
      .contract_address
      .as_deref()
      .map(|a| a.parse().with_context(|| format!("Invalid swap.contract_address: {a}")))
      .transpose()
  }
}

impl AppConfig {
  /// Look up a network by name.
  pub fn network(&self, name: &str) -> Result<&NetworkConfig> {
    self.networks.get(name).with_context(|| {
      let known: Vec<&str> = self.networks.keys().map(String::as_str).collect();
      format!("Unknown network '{name}' (configured: {})", known.join(", "))
    })
  }

  /// Deployment parameters for `network`, external addresses included.
  pub fn deploy_params(&self, network: &NetworkConfig) -> Result<DeployParams> {
    let moc_address = parse_optional_address(network.moc_address.as_deref(), "moc_address")?
      .unwrap_or(deployment::TESTNET_MOC_ADDRESS);
    let doc_address = parse_optional_address(network.doc_address.as_deref(), "doc_address")?
      .unwrap_or(deployment::TESTNET_DOC_ADDRESS);

    Ok(DeployParams {
      token_supply: self.deploy.token_supply,
      token_decimals: self.deploy.token_decimals,
      mint_fee: U256::from(self.deploy.mint_fee_wei),
      btc_price: U256::from(self.deploy.btc_price),
      doc_owner_index: self.deploy.doc_owner_index,
      moc_address,
      doc_address,
    })
  }
}

fn parse_optional_address(value: Option<&str>, field: &str) -> Result<Option<Address>> {
  value
    .map(|a| a.parse().with_context(|| format!("Invalid {field}: {a}")))
    .transpose()
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_artifacts_dir() -> String {
  "artifacts".to_string()
}

fn default_deployments_dir() -> String {
  "deployments".to_string()
}

fn default_receipt_poll_ms() -> u64 {
  1_000
}

fn default_receipt_timeout_secs() -> u64 {
  600
}

fn default_token_supply() -> u64 {
  deployment::DEFAULT_TOKEN_SUPPLY
}

fn default_token_decimals() -> u8 {
  deployment::DEFAULT_TOKEN_DECIMALS
}

fn default_mint_fee_wei() -> u64 {
  deployment::DEFAULT_MINT_FEE_WEI
}

fn default_btc_price() -> u64 {
  deployment::DEFAULT_BTC_PRICE
}

fn default_doc_owner_index() -> usize {
  deployment::DEFAULT_DOC_OWNER_INDEX
}

fn default_expected_version() -> u8 {
  2
}

fn default_confirmations() -> u64 {
  1
}
