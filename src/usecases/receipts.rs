//! Receipt Polling - Wait for Transactions to be Mined
//!
//! Polls `eth_getTransactionReceipt` at a fixed interval until the receipt
//! shows up (and, optionally, until enough blocks are built on top of it).

use std::time::{Duration, Instant};

use alloy::primitives::TxHash;
use anyhow::Result;
use tracing::{debug, instrument};

use crate::domain::error::ReceiptError;
use crate::ports::chain_client::{ChainClient, TxReceipt};

/// How to wait for a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptPolicy {
    pub poll_interval: Duration,
    /// `None` waits forever.
    pub timeout: Option<Duration>,
    /// 1 = included in a block.
    pub confirmations: u64,
}

impl Default for ReceiptPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            timeout: Some(Duration::from_secs(600)),
            confirmations: 1,
        }
    }
}

impl ReceiptPolicy {
    pub const fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations;
        self
    }
}

/// Poll until `tx_hash` is mined with the requested confirmations.
///
/// # Errors
/// `ReceiptError::Timeout` once `policy.timeout` elapses; RPC errors are
/// propagated immediately.
#[instrument(skip_all, fields(%tx_hash))]
pub async fn wait_for_receipt<C>(
    client: &C,
    tx_hash: TxHash,
    policy: ReceiptPolicy,
) -> Result<TxReceipt>
where
    C: ChainClient + ?Sized,
{
    let started = Instant::now();

    loop {
        if let Some(receipt) = client.receipt(tx_hash).await? {
            if is_confirmed(client, &receipt, policy.confirmations).await? {
                return Ok(receipt);
            }
        }

        if let Some(timeout) = policy.timeout {
            if started.elapsed() >= timeout {
                return Err(ReceiptError::Timeout {
                    tx_hash,
                    waited_secs: started.elapsed().as_secs(),
                }
                .into());
            }
        }

        debug!(poll_interval = ?policy.poll_interval, "Receipt not ready, polling again");
        tokio::time::sleep(policy.poll_interval).await;
    }
}

async fn is_confirmed<C>(client: &C, receipt: &TxReceipt, confirmations: u64) -> Result<bool>
where
    C: ChainClient + ?Sized,
{
    if confirmations <= 1 {
        return Ok(true);
    }
    let Some(included) = receipt.block_number else {
        return Ok(false);
    };
    let head = client.block_number().await?;
    Ok(head.saturating_sub(included) + 1 >= confirmations)
}
