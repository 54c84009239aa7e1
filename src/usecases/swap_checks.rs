//! Swap Lifecycle Checks - Lock / Claim / Refund against a Live EtherSwap
//!
//! Attaches to an already deployed `EtherSwap` and drives it through its
//! lifecycle, asserting on what the contract reports:
//! - lock: contract balance grows by the amount, `Lockup` event, swap stored
//! - claim: `Claim` event carrying the preimage, swap removed
//! - refund: contract balance shrinks by the amount, `Refund` event, swap removed
//!
//! Every check returns `SwapError` on a failed assertion so a suite run
//! stops at the first broken expectation.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, Log, TxHash, B256, U256};
use alloy::sol_types::{SolCall, SolEvent};
use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::domain::abi::IEtherSwap;
use crate::domain::error::{ChainError, SwapError};
use crate::domain::swap::{Preimage, SwapValues, WEI_PER_ETHER};
use crate::ports::chain_client::{ChainClient, OutgoingTx, TxReceipt};

use super::receipts::{wait_for_receipt, ReceiptPolicy};

/// A mined lifecycle transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutcome {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: U256,
}

impl From<&TxReceipt> for TxOutcome {
    fn from(receipt: &TxReceipt) -> Self {
        Self {
            tx_hash: receipt.tx_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        }
    }
}

/// Result of a full lock-then-claim suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteReport {
    /// Names of the checks that passed, in order.
    pub passed: Vec<&'static str>,
    pub swap_id: B256,
    pub lock: TxOutcome,
    pub claim: TxOutcome,
}

/// Drives one deployed `EtherSwap` contract.
pub struct SwapChecker<C: ChainClient + ?Sized> {
    client: Arc<C>,
    contract: Address,
    receipts: ReceiptPolicy,
}

impl<C: ChainClient + ?Sized> SwapChecker<C> {
    pub fn new(client: Arc<C>, contract: Address, receipts: ReceiptPolicy) -> Self {
        Self {
            client,
            contract,
            receipts,
        }
    }

    /// Fail early if nothing is deployed at the contract address.
    pub async fn ensure_deployed(&self) -> Result<()> {
        let code = self.client.code_at(self.contract).await?;
        if code.is_empty() {
            return Err(SwapError::NoCode(self.contract.to_string()).into());
        }
        Ok(())
    }

    async fn view<T: SolCall>(&self, call: &T) -> Result<T::Return> {
        let output = self
            .client
            .call(self.contract, Bytes::from(call.abi_encode()))
            .await?;
        T::abi_decode_returns(&output, true)
            .with_context(|| format!("Malformed return data from {}", T::SIGNATURE))
    }

    /// `version()`
    pub async fn version(&self) -> Result<u8> {
        Ok(self.view(&IEtherSwap::versionCall {}).await?._0)
    }

    /// The contract must report `expected` as its version.
    #[instrument(skip(self))]
    pub async fn check_version(&self, expected: u8) -> Result<()> {
        let version = self.version().await?;
        if version != expected {
            return Err(SwapError::assertion("version", expected, version).into());
        }
        info!(version, "Version matches");
        Ok(())
    }

    /// The contract's `hashValues` for `values`.
    pub async fn hash_values(&self, values: &SwapValues) -> Result<B256> {
        let call = IEtherSwap::hashValuesCall {
            preimageHash: values.preimage_hash,
            amount: values.amount,
            claimAddress: values.claim_address,
            refundAddress: values.refund_address,
            timelock: values.timelock,
        };
        Ok(self.view(&call).await?._0)
    }

    /// The contract must hash swap values exactly like the local commitment.
    #[instrument(skip_all)]
    pub async fn check_hash_values(&self, values: &SwapValues) -> Result<B256> {
        let onchain = self.hash_values(values).await?;
        let local = values.hash_values();
        if onchain != local {
            return Err(SwapError::assertion("hash values", local, onchain).into());
        }
        info!(swap_id = %local, "Swap hash matches");
        Ok(local)
    }

    /// Whether a swap with these values is currently locked.
    pub async fn is_locked(&self, values: &SwapValues) -> Result<bool> {
        let swap_id = self.hash_values(values).await?;
        Ok(self.view(&IEtherSwap::swapsCall { _0: swap_id }).await?._0)
    }

    /// Ether sent without a function selector must be refused.
    #[instrument(skip(self))]
    pub async fn check_rejects_plain_ether(&self, from: Address) -> Result<()> {
        let tx = OutgoingTx::call(from, self.contract, Bytes::new())
            .with_value(U256::from(WEI_PER_ETHER));

        let tx_hash = match self.client.send(tx).await {
            Ok(tx_hash) => tx_hash,
            Err(e) if e.downcast_ref::<ChainError>().is_some() => {
                info!(error = %e, "Plain ether transfer rejected");
                return Ok(());
            }
            Err(e) => return Err(e.context("Plain ether transfer could not be sent")),
        };

        let receipt = wait_for_receipt(self.client.as_ref(), tx_hash, self.receipts).await?;
        if receipt.success {
            return Err(SwapError::assertion(
                "plain ether transfer",
                "revert",
                format!("accepted in {tx_hash}"),
            )
            .into());
        }
        info!(%tx_hash, "Plain ether transfer reverted");
        Ok(())
    }

    /// Lock `values.amount` from the refund address.
    #[instrument(skip_all, fields(amount = %values.amount, timelock = %values.timelock))]
    pub async fn lock(&self, values: &SwapValues) -> Result<TxOutcome> {
        let balance_before = self.client.balance(self.contract).await?;

        let call = IEtherSwap::lockCall {
            preimageHash: values.preimage_hash,
            claimAddress: values.claim_address,
            timelock: values.timelock,
        };
        let tx = OutgoingTx::call(values.refund_address, self.contract, call.abi_encode().into())
            .with_value(values.amount);
        let receipt = self.send_and_wait(tx).await?;

        let balance_after = self.client.balance(self.contract).await?;
        let delta = balance_after.saturating_sub(balance_before);
        if delta != values.amount {
            return Err(SwapError::assertion("lockup balance", values.amount, delta).into());
        }

        let event: IEtherSwap::Lockup = self.first_event(&receipt, "lockup")?;
        let expected = IEtherSwap::Lockup {
            preimageHash: values.preimage_hash,
            amount: values.amount,
            claimAddress: values.claim_address,
            refundAddress: values.refund_address,
            timelock: values.timelock,
        };
        if event != expected {
            return Err(SwapError::assertion(
                "lockup event",
                format!("{expected:?}"),
                format!("{event:?}"),
            )
            .into());
        }

        if !self.is_locked(values).await? {
            return Err(SwapError::assertion("lockup mapping", true, false).into());
        }

        info!(tx_hash = %receipt.tx_hash, "Lockup verified");
        Ok(TxOutcome::from(&receipt))
    }

    /// Claim with `preimage` from `claimer`.
    #[instrument(skip_all, fields(%claimer, amount = %values.amount))]
    pub async fn claim(
        &self,
        preimage: &Preimage,
        values: &SwapValues,
        claimer: Address,
        gas_limit: Option<u64>,
    ) -> Result<TxOutcome> {
        if preimage.hash() != values.preimage_hash {
            return Err(
                SwapError::assertion("claim preimage", values.preimage_hash, preimage.hash())
                    .into(),
            );
        }

        let call = IEtherSwap::claimCall {
            preimage: preimage.as_b256(),
            amount: values.amount,
            refundAddress: values.refund_address,
            timelock: values.timelock,
        };
        let tx = OutgoingTx::call(claimer, self.contract, call.abi_encode().into())
            .with_gas_limit(gas_limit);
        let receipt = self.send_and_wait(tx).await?;

        let event: IEtherSwap::Claim = self.first_event(&receipt, "claim")?;
        if event.preimageHash != values.preimage_hash {
            return Err(SwapError::assertion(
                "claim event hash",
                values.preimage_hash,
                event.preimageHash,
            )
            .into());
        }
        if event.preimage != preimage.as_b256() {
            return Err(SwapError::assertion(
                "claim event preimage",
                preimage.as_b256(),
                event.preimage,
            )
            .into());
        }

        info!(preimage = %preimage, preimage_hash = %values.preimage_hash, "Claimed");

        if self.is_locked(values).await? {
            return Err(SwapError::assertion("claim mapping", false, true).into());
        }

        Ok(TxOutcome::from(&receipt))
    }

    /// Refund a timed out swap to its refund address.
    #[instrument(skip_all, fields(amount = %values.amount, timelock = %values.timelock))]
    pub async fn refund(&self, values: &SwapValues, gas_limit: Option<u64>) -> Result<TxOutcome> {
        let head = self.client.block_number().await?;
        if U256::from(head) < values.timelock {
            warn!(
                head,
                timelock = %values.timelock,
                "Timelock not reached yet, refund will likely revert"
            );
        }

        let balance_before = self.client.balance(self.contract).await?;

        let call = IEtherSwap::refundCall {
            preimageHash: values.preimage_hash,
            amount: values.amount,
            claimAddress: values.claim_address,
            timelock: values.timelock,
        };
        let tx = OutgoingTx::call(values.refund_address, self.contract, call.abi_encode().into())
            .with_gas_limit(gas_limit);
        let receipt = self.send_and_wait(tx).await?;

        let balance_after = self.client.balance(self.contract).await?;
        let delta = balance_before.saturating_sub(balance_after);
        if delta != values.amount {
            return Err(SwapError::assertion("refund balance", values.amount, delta).into());
        }

        let event: IEtherSwap::Refund = self.first_event(&receipt, "refund")?;
        if event.preimageHash != values.preimage_hash {
            return Err(SwapError::assertion(
                "refund event hash",
                values.preimage_hash,
                event.preimageHash,
            )
            .into());
        }

        if self.is_locked(values).await? {
            return Err(SwapError::assertion("refund mapping", false, true).into());
        }

        info!(tx_hash = %receipt.tx_hash, "Refund verified");
        Ok(TxOutcome::from(&receipt))
    }

    /// Version, plain-ether rejection, hash, lock, claim; stops at the first failure.
    ///
    /// `values.refund_address` locks and `claimer` claims.
    pub async fn run_suite(
        &self,
        expected_version: u8,
        preimage: &Preimage,
        values: &SwapValues,
        claimer: Address,
        claim_gas_limit: Option<u64>,
    ) -> Result<SuiteReport> {
        self.ensure_deployed().await?;
        let mut passed = Vec::with_capacity(5);

        self.check_version(expected_version).await?;
        passed.push("version");

        self.check_rejects_plain_ether(values.refund_address).await?;
        passed.push("rejects plain ether");

        let swap_id = self.check_hash_values(values).await?;
        passed.push("hash values");

        let lock = self.lock(values).await?;
        passed.push("lock");

        let claim = self.claim(preimage, values, claimer, claim_gas_limit).await?;
        passed.push("claim");

        Ok(SuiteReport {
            passed,
            swap_id,
            lock,
            claim,
        })
    }

    async fn send_and_wait(&self, tx: OutgoingTx) -> Result<TxReceipt> {
        let tx_hash = self.client.send(tx).await?;
        info!(%tx_hash, "Transaction sent");
        let receipt = wait_for_receipt(self.client.as_ref(), tx_hash, self.receipts).await?;
        if !receipt.success {
            return Err(SwapError::Reverted(tx_hash).into());
        }
        Ok(receipt)
    }

    /// Decode the first log of `receipt` as `E`, emitted by this contract.
    fn first_event<E: SolEvent>(&self, receipt: &TxReceipt, check: &'static str) -> Result<E> {
        let missing = || SwapError::MissingEvent {
            check,
            event: E::SIGNATURE,
        };
        let log: &Log = receipt.logs.first().ok_or_else(missing)?;
        if log.address != self.contract {
            return Err(missing().into());
        }
        let decoded = E::decode_log(log, true).map_err(|_| missing())?;
        Ok(decoded.data)
    }
}
