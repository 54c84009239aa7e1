//! Artifact Source Port - Contract Creation Code
//!
//! Abstracts where creation bytecode comes from so the deployment
//! orchestrator can run against in-memory fixtures in tests.

use alloy::primitives::Bytes;
use async_trait::async_trait;

use crate::domain::deployment::ContractKind;

/// Provides creation bytecode for the swap contracts.
#[async_trait]
pub trait ArtifactSource: Send + Sync + 'static {
    /// Creation bytecode without constructor arguments.
    async fn bytecode(&self, contract: ContractKind) -> anyhow::Result<Bytes>;
}
