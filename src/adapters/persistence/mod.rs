//! Persistence Adapters - JSON Files on Disk
//!
//! - `deployments`: per-network deployment records (atomic writes)

pub mod deployments;

pub use deployments::DeploymentStore;
