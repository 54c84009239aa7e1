//! JSON-RPC Chain Client - alloy-rs 0.9 Connection Management
//!
//! Implements the `ChainClient` port over an HTTP JSON-RPC endpoint.
//! Validates connectivity (and the chain ID, when configured) at startup
//! and signs with every configured local key.
//!
//! The provider is stored as a type-erased `dyn Provider`: alloy 0.9's
//! builder returns a deeply nested filler type that would otherwise leak
//! into every signature.

use std::sync::Arc;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::transports::TransportError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::config::NetworkConfig;
use crate::domain::error::{is_revert_message, ChainError};
use crate::ports::chain_client::{ChainClient, OutgoingTx, TxReceipt};

use super::signers::Signers;

/// `ChainClient` backed by an alloy HTTP provider with local signers.
pub struct RpcChainClient {
    /// The alloy provider with wallet + recommended fillers (type-erased).
    provider: Arc<dyn Provider + Send + Sync>,
    /// Signer addresses in key order.
    accounts: Vec<Address>,
    /// Legacy gas price to pin on every transaction (RSK has no EIP-1559).
    gas_price: Option<u128>,
    chain_id: u64,
}

impl RpcChainClient {
    /// Connect to the network's RPC endpoint and validate the chain ID.
    #[instrument(skip_all, fields(rpc_url = %network.rpc_url))]
    pub async fn connect(network: &NetworkConfig, signers: Signers) -> Result<Self> {
        let accounts = signers.addresses();
        let wallet = signers.into_wallet()?;

        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_builtin(&network.rpc_url)
            .await
            .with_context(|| format!("Failed to connect to {}", network.rpc_url))?;

        let provider: Arc<dyn Provider + Send + Sync> = Arc::new(provider);

        let chain_id = provider
            .get_chain_id()
            .await
            .context("Failed to query chain ID")?;

        if let Some(expected) = network.chain_id {
            anyhow::ensure!(
                chain_id == expected,
                "Expected chain_id={expected}, node reports {chain_id}"
            );
        }

        info!(chain_id, accounts = accounts.len(), "Connected to RPC");

        Ok(Self {
            provider,
            accounts,
            gas_price: network.gas_price.map(u128::from),
            chain_id,
        })
    }

    fn build_request(&self, tx: OutgoingTx) -> TransactionRequest {
        let request = TransactionRequest::default()
            .with_from(tx.from)
            .with_value(tx.value);

        let mut request = match tx.to {
            Some(to) => request.with_to(to).with_input(tx.input),
            None => request.with_deploy_code(tx.input),
        };

        if let Some(gas_limit) = tx.gas_limit {
            request.set_gas_limit(gas_limit);
        }
        if let Some(gas_price) = self.gas_price {
            request.set_gas_price(gas_price);
        }
        request
    }
}

fn to_port_receipt(receipt: &TransactionReceipt) -> TxReceipt {
    TxReceipt {
        tx_hash: receipt.transaction_hash,
        success: receipt.status(),
        block_number: receipt.block_number,
        gas_used: U256::from(receipt.gas_used),
        effective_gas_price: U256::from(receipt.effective_gas_price),
        contract_address: receipt.contract_address,
        logs: receipt
            .inner
            .logs()
            .iter()
            .map(|log| log.inner.clone())
            .collect(),
    }
}

/// Reverts surface as `ChainError::ExecutionReverted`; anything else keeps the
/// transport error.
fn send_error(err: TransportError) -> anyhow::Error {
    match err.as_error_resp() {
        Some(resp) if is_revert_message(&resp.message) => {
            ChainError::ExecutionReverted(resp.message.to_string()).into()
        }
        _ => anyhow::Error::new(err).context("Transaction rejected by node"),
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    fn accounts(&self) -> Vec<Address> {
        self.accounts.clone()
    }

    /// Checked once at connect; the chain ID cannot change afterwards.
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.chain_id)
    }

    async fn gas_price(&self) -> Result<U256> {
        let price = self
            .provider
            .get_gas_price()
            .await
            .context("Failed to query gas price")?;
        Ok(U256::from(price))
    }

    async fn block_number(&self) -> Result<u64> {
        self.provider
            .get_block_number()
            .await
            .context("Failed to query block number")
    }

    async fn balance(&self, address: Address) -> Result<U256> {
        self.provider
            .get_balance(address)
            .await
            .with_context(|| format!("Failed to query balance of {address}"))
    }

    async fn code_at(&self, address: Address) -> Result<Bytes> {
        self.provider
            .get_code_at(address)
            .await
            .with_context(|| format!("Failed to query code at {address}"))
    }

    #[instrument(skip(self, input), fields(to = %to))]
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes> {
        let request = TransactionRequest::default().with_to(to).with_input(input);
        self.provider
            .call(&request)
            .await
            .with_context(|| format!("eth_call to {to} failed"))
    }

    #[instrument(skip(self, tx), fields(from = %tx.from, to = ?tx.to))]
    async fn send(&self, tx: OutgoingTx) -> Result<TxHash> {
        let request = self.build_request(tx);
        let pending = self
            .provider
            .send_transaction(request)
            .await
            .map_err(send_error)?;

        let tx_hash = *pending.tx_hash();
        debug!(%tx_hash, "Transaction broadcast");
        Ok(tx_hash)
    }

    async fn receipt(&self, tx_hash: TxHash) -> Result<Option<TxReceipt>> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .with_context(|| format!("Failed to query receipt of {tx_hash}"))?;
        Ok(receipt.as_ref().map(to_port_receipt))
    }
}
