//! Use Cases - Deployment and Swap Lifecycle Orchestration
//!
//! Everything here talks to the chain through the `ChainClient` port only,
//! so each use case runs unchanged against a node or a mock.

pub mod deployer;
pub mod gas_oracle;
pub mod receipts;
pub mod swap_checks;
pub mod validator;

pub use deployer::Deployer;
pub use gas_oracle::GasOracle;
pub use receipts::{wait_for_receipt, ReceiptPolicy};
pub use swap_checks::{SuiteReport, SwapChecker, TxOutcome};
pub use validator::{ContractValidator, ValidationResult};
