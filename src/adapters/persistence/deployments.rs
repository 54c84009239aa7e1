//! Deployment Store - Atomic JSON Deployment Records
//!
//! Saves one record per network to `<dir>/<network>.json` using atomic
//! writes (write to tmp file, then rename), so a crash mid-write never
//! leaves a truncated record behind.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, instrument};

use crate::domain::deployment::DeploymentRecord;

/// Per-network deployment records on disk.
pub struct DeploymentStore {
    dir: PathBuf,
}

impl DeploymentStore {
    /// Create a store in `dir`, creating the directory if needed.
    pub async fn new(dir: &str) -> Result<Self> {
        let dir = Path::new(dir);
        fs::create_dir_all(dir)
            .await
            .context("Failed to create deployments directory")?;

        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, network: &str) -> PathBuf {
        self.dir.join(format!("{network}.json"))
    }

    /// Save a record atomically (tmp → rename), replacing any previous one.
    #[instrument(skip(self, record), fields(network = %record.network))]
    pub async fn save(&self, record: &DeploymentRecord) -> Result<PathBuf> {
        let path = self.path_for(&record.network);
        let tmp_path = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(record)
            .context("Failed to serialize deployment record")?;

        fs::write(&tmp_path, &json)
            .await
            .context("Failed to write tmp deployment record")?;

        fs::rename(&tmp_path, &path)
            .await
            .context("Failed to rename deployment record")?;

        info!(
            path = %path.display(),
            run_id = %record.run_id,
            contracts = record.contracts.len(),
            "Deployment record saved"
        );

        Ok(path)
    }

    /// Load the latest record for `network`, `None` if it was never deployed.
    #[instrument(skip(self))]
    pub async fn load(&self, network: &str) -> Result<Option<DeploymentRecord>> {
        let path = self.path_for(network);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let record: DeploymentRecord = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(Some(record))
    }
}
