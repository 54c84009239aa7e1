//! Gas Oracle - Gas Price Resolution
//!
//! A network can pin a gas price in the config (RSK nodes report a
//! minimum that is often too low to get mined promptly). Otherwise the
//! node's `eth_gasPrice` is used.

use std::sync::Arc;

use alloy::primitives::U256;
use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::domain::gas::wei_to_gwei;
use crate::ports::chain_client::ChainClient;

pub struct GasOracle<C: ChainClient + ?Sized> {
    client: Arc<C>,
    /// Configured price in wei, overrides the node.
    configured: Option<U256>,
}

impl<C: ChainClient + ?Sized> GasOracle<C> {
    pub fn new(client: Arc<C>, configured_wei: Option<u64>) -> Self {
        Self {
            client,
            configured: configured_wei.map(U256::from),
        }
    }

    /// Gas price in wei.
    #[instrument(skip(self))]
    pub async fn gas_price(&self) -> Result<U256> {
        if let Some(price) = self.configured {
            debug!(%price, "Using configured gas price");
            return Ok(price);
        }
        self.client
            .gas_price()
            .await
            .context("Failed to query gas price")
    }

    /// Gas price in whole gwei (truncated).
    pub async fn gas_price_gwei(&self) -> Result<U256> {
        Ok(wei_to_gwei(self.gas_price().await?))
    }
}
