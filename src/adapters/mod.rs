//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (JSON-RPC, local key material, file I/O). Each
//! sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `chain`: EVM node access via alloy-rs, signers, build artifacts
//! - `persistence`: deployment records as JSON

pub mod chain;
pub mod persistence;
