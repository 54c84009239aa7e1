//! Contract Validator - On-chain Code Checks
//!
//! Verifies that addresses point at deployed contracts before anything is
//! sent to them. Catches typos and wrong-network configs (an EOA or an
//! undeployed address silently accepts calls and returns empty data).

use std::sync::Arc;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::ports::chain_client::ChainClient;

/// Result of validating a single contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub name: String,
    pub address: Address,
    pub has_code: bool,
    /// Size of the deployed code in bytes.
    pub code_size: usize,
}

pub struct ContractValidator<C: ChainClient + ?Sized> {
    client: Arc<C>,
}

impl<C: ChainClient + ?Sized> ContractValidator<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Check whether code exists at `address`.
    #[instrument(skip(self))]
    pub async fn validate(&self, name: &str, address: Address) -> Result<ValidationResult> {
        let code = self
            .client
            .code_at(address)
            .await
            .with_context(|| format!("Failed to query code for {name}"))?;

        let result = ValidationResult {
            name: name.to_string(),
            address,
            has_code: !code.is_empty(),
            code_size: code.len(),
        };

        if result.has_code {
            info!(
                contract = name,
                %address,
                size = result.code_size,
                "Contract validated: code exists on-chain"
            );
        } else {
            warn!(contract = name, %address, "Contract has no code, possible misconfiguration");
        }

        Ok(result)
    }

    /// Validate every `(name, address)` pair; all results are returned.
    pub async fn validate_all(
        &self,
        contracts: &[(&str, Address)],
    ) -> Result<Vec<ValidationResult>> {
        let mut results = Vec::with_capacity(contracts.len());
        for (name, address) in contracts {
            results.push(self.validate(name, *address).await?);
        }
        Ok(results)
    }
}
