//! Domain layer - swap records, deployment plans and gas accounting.
//!
//! Pure logic only: no RPC, no filesystem (hexagonal architecture inner ring).
//! Everything here is testable without a node.

pub mod abi;
pub mod deployment;
pub mod error;
pub mod gas;
pub mod swap;

// Re-export core types for convenience
pub use deployment::{ContractKind, DeployParams, DeployPlan, DeployStep, NetworkKind};
pub use error::{AmountError, ChainError, DeployError, PreimageError, ReceiptError, SwapError};
pub use gas::GasTally;
pub use swap::{Amount, Preimage, SwapValues};
