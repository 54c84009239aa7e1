//! Build Artifacts - Contract Creation Code from Compiler Output
//!
//! Solidity is compiled outside this tool. Creation bytecode is read from
//! the compiler's JSON artifacts:
//! - Hardhat: `<root>/contracts/<Name>.sol/<Name>.json`, `"bytecode": "0x…"`
//! - Foundry: `<root>/<Name>.sol/<Name>.json`, `"bytecode": {"object": "0x…"}`

use std::path::{Path, PathBuf};

use alloy::hex;
use alloy::primitives::Bytes;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs;
use tracing::{debug, instrument};

use crate::domain::deployment::ContractKind;
use crate::ports::artifacts::ArtifactSource;

#[derive(Debug, Deserialize)]
struct ArtifactFile {
    bytecode: BytecodeField,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    Hex(String),
    Object { object: String },
}

impl BytecodeField {
    fn as_hex(&self) -> &str {
        match self {
            Self::Hex(hex) | Self::Object { object: hex } => hex,
        }
    }
}

/// Reads creation bytecode for the swap contracts.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Candidate artifact paths for `name`, in lookup order.
    pub fn candidates(&self, name: &str) -> [PathBuf; 2] {
        let file = format!("{name}.json");
        let dir = format!("{name}.sol");
        [
            self.root.join("contracts").join(&dir).join(&file),
            self.root.join(&dir).join(&file),
        ]
    }
}

#[async_trait]
impl ArtifactSource for ArtifactStore {
    #[instrument(skip(self), fields(contract = %contract))]
    async fn bytecode(&self, contract: ContractKind) -> Result<Bytes> {
        let name = contract.name();
        for path in self.candidates(name) {
            if fs::try_exists(&path).await.unwrap_or(false) {
                debug!(path = %path.display(), "Reading artifact");
                return read_artifact(&path, name).await;
            }
        }

        bail!(
            "No build artifact for {name} under {}; compile the contracts first",
            self.root.display()
        )
    }
}

async fn read_artifact(path: &Path, name: &str) -> Result<Bytes> {
    let json = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_artifact(&json, name)
}

/// Extract creation bytecode from artifact JSON.
pub fn parse_artifact(json: &str, name: &str) -> Result<Bytes> {
    let artifact: ArtifactFile = serde_json::from_str(json)
        .with_context(|| format!("Artifact for {name} is not valid JSON"))?;

    let code = hex::decode(artifact.bytecode.as_hex())
        .with_context(|| format!("Artifact for {name} has malformed bytecode"))?;

    if code.is_empty() {
        bail!("Artifact for {name} has empty bytecode (abstract contract or interface?)");
    }

    Ok(code.into())
}
