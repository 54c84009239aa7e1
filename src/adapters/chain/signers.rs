//! Local Signers - Private Keys from the Environment
//!
//! Keys come from `ETHERSWAP_PRIVATE_KEYS` (comma separated hex). Order
//! matters: index 0 deploys and locks, index 1 claims, index 2 owns the
//! dummy DOC token on local networks. Keys are never logged.

use std::fmt;

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};

/// Environment variable holding the signer keys.
pub const PRIVATE_KEYS_ENV: &str = "ETHERSWAP_PRIVATE_KEYS";

/// Ordered set of local signing keys.
pub struct Signers {
    signers: Vec<PrivateKeySigner>,
}

impl Signers {
    /// Load keys from `ETHERSWAP_PRIVATE_KEYS`.
    ///
    /// Must be set in the shell or `.env` (never committed to git).
    pub fn from_env() -> Result<Self> {
        let raw = std::env::var(PRIVATE_KEYS_ENV)
            .with_context(|| format!("{PRIVATE_KEYS_ENV} not set"))?;
        Self::parse(&raw)
    }

    /// Parse a comma separated list of hex private keys.
    pub fn parse(raw: &str) -> Result<Self> {
        let signers = raw
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .enumerate()
            .map(|(i, key)| {
                key.parse::<PrivateKeySigner>()
                    .with_context(|| format!("Invalid private key at index {i}"))
            })
            .collect::<Result<Vec<_>>>()?;

        anyhow::ensure!(!signers.is_empty(), "{PRIVATE_KEYS_ENV} holds no keys");
        Ok(Self { signers })
    }

    /// Signer addresses, in key order.
    pub fn addresses(&self) -> Vec<Address> {
        self.signers.iter().map(PrivateKeySigner::address).collect()
    }

    /// Wallet holding every key; the first one is the default sender.
    pub fn into_wallet(self) -> Result<EthereumWallet> {
        let mut keys = self.signers.into_iter();
        let first = keys.next().context("No signing keys configured")?;
        let mut wallet = EthereumWallet::from(first);
        for signer in keys {
            wallet.register_signer(signer);
        }
        Ok(wallet)
    }
}

impl fmt::Debug for Signers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signers")
            .field("addresses", &self.addresses())
            .finish()
    }
}
