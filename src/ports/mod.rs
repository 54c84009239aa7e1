//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires from
//! the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `ChainClient`: JSON-RPC access to an EVM node with local signers
//! - `ArtifactSource`: compiled contract bytecode

pub mod artifacts;
pub mod chain_client;

pub use artifacts::ArtifactSource;
pub use chain_client::{ChainClient, OutgoingTx, TxReceipt};
