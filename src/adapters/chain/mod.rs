//! Chain Adapters - EVM Interaction Layer
//!
//! Provides on-chain access via alloy-rs 0.9 for:
//! - JSON-RPC client implementing the `ChainClient` port
//! - Local private-key signers loaded from the environment
//! - Compiled contract artifacts (creation bytecode)

pub mod artifacts;
pub mod provider;
pub mod signers;

pub use artifacts::ArtifactStore;
pub use provider::RpcChainClient;
pub use signers::Signers;
