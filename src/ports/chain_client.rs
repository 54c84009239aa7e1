//! Chain Client Port - On-chain Interaction Interface
//!
//! Defines the single seam between the use cases and an EVM node. Use cases
//! encode calldata and decode logs themselves, so the port only moves bytes,
//! balances and receipts. Implemented over JSON-RPC by
//! `adapters::chain::RpcChainClient`.

use alloy::primitives::{Address, Bytes, Log, TxHash, U256};
use async_trait::async_trait;

/// A transaction to sign and broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingTx {
    /// Signer to send from. Must be one of the client's accounts.
    pub from: Address,
    /// Recipient; `None` creates a contract from `input`.
    pub to: Option<Address>,
    pub input: Bytes,
    pub value: U256,
    /// Explicit gas limit; `None` lets the node estimate.
    pub gas_limit: Option<u64>,
}

impl OutgoingTx {
    /// Contract creation transaction.
    pub fn create(from: Address, code: Bytes) -> Self {
        Self {
            from,
            to: None,
            input: code,
            value: U256::ZERO,
            gas_limit: None,
        }
    }

    /// Call `to` with `input`.
    pub fn call(from: Address, to: Address, input: Bytes) -> Self {
        Self {
            from,
            to: Some(to),
            input,
            value: U256::ZERO,
            gas_limit: None,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: Option<u64>) -> Self {
        self.gas_limit = gas_limit;
        self
    }
}

/// The parts of a transaction receipt the use cases inspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    /// `false` if the transaction reverted.
    pub success: bool,
    pub block_number: Option<u64>,
    pub gas_used: U256,
    /// Price actually paid per gas unit.
    pub effective_gas_price: U256,
    /// Set for contract creation transactions.
    pub contract_address: Option<Address>,
    /// Logs in emission order.
    pub logs: Vec<Log>,
}

/// Trait for on-chain interactions via alloy-rs.
#[async_trait]
pub trait ChainClient: Send + Sync + 'static {
    /// Signer addresses, in configuration order.
    fn accounts(&self) -> Vec<Address>;

    async fn chain_id(&self) -> anyhow::Result<u64>;

    /// Current gas price reported by the node, in wei.
    async fn gas_price(&self) -> anyhow::Result<U256>;

    async fn block_number(&self) -> anyhow::Result<u64>;

    async fn balance(&self, address: Address) -> anyhow::Result<U256>;

    /// Deployed code at `address`; empty for accounts without code.
    async fn code_at(&self, address: Address) -> anyhow::Result<Bytes>;

    /// `eth_call` against the latest block.
    async fn call(&self, to: Address, input: Bytes) -> anyhow::Result<Bytes>;

    /// Sign and broadcast. Fails if the node rejects the transaction,
    /// including when gas estimation reverts.
    async fn send(&self, tx: OutgoingTx) -> anyhow::Result<TxHash>;

    /// Receipt of a mined transaction, `None` while pending.
    async fn receipt(&self, tx_hash: TxHash) -> anyhow::Result<Option<TxReceipt>>;
}
