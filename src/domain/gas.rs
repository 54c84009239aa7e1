//! Gas cost accounting for one orchestrator run.

use alloy::primitives::utils::format_units;
use alloy::primitives::U256;

/// Wei per gwei.
pub const WEI_PER_GWEI: u64 = 1_000_000_000;

/// Running total of `gas_used * gas_price` across deployment receipts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GasTally {
    total_wei: U256,
    transactions: usize,
}

impl GasTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one mined transaction and return its cost in wei.
    pub fn record(&mut self, gas_used: U256, gas_price: U256) -> U256 {
        let cost = gas_used.saturating_mul(gas_price);
        self.total_wei = self.total_wei.saturating_add(cost);
        self.transactions += 1;
        cost
    }

    pub const fn total_wei(&self) -> U256 {
        self.total_wei
    }

    pub const fn transactions(&self) -> usize {
        self.transactions
    }

    /// Total cost in ether with full 18 decimal precision.
    pub fn total_ether(&self) -> String {
        format_ether(self.total_wei)
    }
}

/// Integer gwei, truncating like the node's own display.
pub fn wei_to_gwei(wei: U256) -> U256 {
    wei / U256::from(WEI_PER_GWEI)
}

/// Format a wei value as a decimal ether string.
pub fn format_ether(wei: U256) -> String {
    // "ether" is a known unit; the fallback only guards the API contract.
    format_units(wei, "ether").unwrap_or_else(|_| format!("{wei} wei"))
}
