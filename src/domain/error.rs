//! Domain error taxonomy.
//!
//! Adapters and the binary wrap these in `anyhow` with context; use cases
//! return them directly so callers (and tests) can match on the variant.

use alloy::primitives::TxHash;
use thiserror::Error;

use super::deployment::ContractKind;

/// Errors parsing a textual amount.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("cannot parse amount '{0}'")]
    Unparsable(String),
    #[error("amount '{0}' is negative")]
    Negative(String),
    #[error("amount '{0}' has precision below one wei")]
    SubWei(String),
    #[error("amount '{0}' overflows uint256")]
    Overflow(String),
}

/// Errors building a preimage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreimageError {
    #[error("preimage is not valid hex: {0}")]
    InvalidHex(String),
    #[error("preimage must be 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// Errors raised while running the deployment plan.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("{0} is referenced before it was deployed")]
    UnresolvedReference(ContractKind),
    #[error("account index {index} requested but only {available} signer(s) configured")]
    MissingAccount { index: usize, available: usize },
    #[error("deployment of {contract} reverted in transaction {tx_hash}")]
    Reverted { contract: ContractKind, tx_hash: TxHash },
    #[error("receipt for {contract} ({tx_hash}) carries no contract address")]
    NoContractAddress { contract: ContractKind, tx_hash: TxHash },
    #[error("external contract {name} at {address} has no code")]
    MissingExternalCode { name: &'static str, address: String },
}

/// Errors raised by swap lifecycle checks.
#[derive(Debug, Error)]
pub enum SwapError {
    #[error("{check}: expected {expected}, got {actual}")]
    Assertion {
        check: &'static str,
        expected: String,
        actual: String,
    },
    #[error("{check}: expected a {event} event as the first log")]
    MissingEvent {
        check: &'static str,
        event: &'static str,
    },
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
    #[error("no contract code at {0}")]
    NoCode(String),
}

/// Errors waiting for a transaction to be mined.
#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("timed out after {waited_secs}s waiting for receipt of {tx_hash}")]
    Timeout { tx_hash: TxHash, waited_secs: u64 },
}

/// Errors reported by the node for a transaction.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Gas estimation or `eth_sendTransaction` failed because the call reverts.
    #[error("execution reverted: {0}")]
    ExecutionReverted(String),
}

/// Whether a JSON-RPC error message reports a reverted execution.
///
/// Geth-style nodes say "execution reverted", RSK says "transaction reverted".
pub fn is_revert_message(message: &str) -> bool {
    message.to_ascii_lowercase().contains("revert")
}

impl SwapError {
    /// Shorthand for a failed equality assertion.
    pub fn assertion(
        check: &'static str,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        Self::Assertion {
            check,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revert_messages() {
        assert!(is_revert_message("execution reverted"));
        assert!(is_revert_message("transaction reverted"));
        assert!(is_revert_message("VM Exception while processing transaction: revert"));
        assert!(!is_revert_message("nonce too low"));
        assert!(!is_revert_message("insufficient funds for gas * price + value"));
    }
}
