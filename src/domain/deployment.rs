//! Deployment plan for the swap contracts.
//!
//! The plan is pure data: which contracts, in which order, with which
//! constructor arguments. Arguments that point at an earlier deployment are
//! resolved when the step runs.

use std::collections::HashMap;
use std::fmt;

use alloy::primitives::{address, Address, Bytes, TxHash, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::abi;
use super::error::DeployError;

/// Mint fee of the dummy DOC token: 21k gas at 0.06 gwei, times 6.
pub const DEFAULT_MINT_FEE_WEI: u64 = 10_000_000 * 21_000 * 6;

/// RBTC gwei to DOC gwei ratio of the dummy DOC token.
pub const DEFAULT_BTC_PRICE: u64 = 20_000;

/// Whole-token supply of the ERC20 test token.
pub const DEFAULT_TOKEN_SUPPLY: u64 = 1_000_000;

pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;

/// Account index that owns the dummy DOC token.
pub const DEFAULT_DOC_OWNER_INDEX: usize = 2;

pub const TEST_TOKEN_NAME: &str = "TestERC20";
pub const TEST_TOKEN_SYMBOL: &str = "TRC";

/// Money on Chain on RSK testnet.
pub const TESTNET_MOC_ADDRESS: Address = address!("2820f6d4D199B8D8838A4B26F9917754B86a0c1F");

/// Dollar on Chain token on RSK testnet.
pub const TESTNET_DOC_ADDRESS: Address = address!("CB46c0ddc60D18eFEB0E586C17Af6ea36452Dae0");

/// The contracts this tooling deploys, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractKind {
    #[serde(rename = "DummyDocMintERC20")]
    DummyDocMintErc20,
    #[serde(rename = "TestERC20")]
    TestErc20,
    #[serde(rename = "ERC20Swap")]
    Erc20Swap,
    EtherSwap,
}

impl ContractKind {
    /// Tokens first: `EtherSwap` takes token addresses in its constructor.
    pub const ALL: [Self; 4] = [
        Self::DummyDocMintErc20,
        Self::TestErc20,
        Self::Erc20Swap,
        Self::EtherSwap,
    ];

    /// Solidity contract name, also the build artifact name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::DummyDocMintErc20 => "DummyDocMintERC20",
            Self::TestErc20 => "TestERC20",
            Self::Erc20Swap => "ERC20Swap",
            Self::EtherSwap => "EtherSwap",
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether the target network has real MoC/DOC contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkKind {
    /// mainnet / testnet: reuse external token contracts, skip test tokens.
    Live,
    /// Anything else: deploy the test tokens too.
    Local,
}

impl NetworkKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "mainnet" | "testnet" => Self::Live,
            _ => Self::Local,
        }
    }
}

/// An address constructor argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressArg {
    Fixed(Address),
    /// Address of a contract deployed earlier in the same run.
    Deployed(ContractKind),
}

impl AddressArg {
    fn resolve(self, deployed: &HashMap<ContractKind, Address>) -> Result<Address, DeployError> {
        match self {
            Self::Fixed(addr) => Ok(addr),
            Self::Deployed(kind) => deployed
                .get(&kind)
                .copied()
                .ok_or(DeployError::UnresolvedReference(kind)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructorArgs {
    None,
    DummyDoc {
        owner: Address,
        mint_fee: U256,
        btc_price: U256,
    },
    Token {
        name: String,
        symbol: String,
        decimals: u8,
        supply: U256,
    },
    EtherSwap {
        moc: AddressArg,
        doc: AddressArg,
    },
}

impl ConstructorArgs {
    /// ABI-encode the arguments, resolving references to earlier deployments.
    pub fn encode(&self, deployed: &HashMap<ContractKind, Address>) -> Result<Bytes, DeployError> {
        Ok(match self {
            Self::None => Bytes::new(),
            Self::DummyDoc {
                owner,
                mint_fee,
                btc_price,
            } => abi::dummy_doc_args(*owner, *mint_fee, *btc_price),
            Self::Token {
                name,
                symbol,
                decimals,
                supply,
            } => abi::test_erc20_args(name, symbol, *decimals, *supply),
            Self::EtherSwap { moc, doc } => {
                abi::ether_swap_args(moc.resolve(deployed)?, doc.resolve(deployed)?)
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployStep {
    pub contract: ContractKind,
    pub args: ConstructorArgs,
}

impl DeployStep {
    /// Supply in whole tokens, for the ERC20 test token only.
    pub fn whole_token_supply(&self) -> Option<U256> {
        match &self.args {
            ConstructorArgs::Token {
                decimals, supply, ..
            } => Some(*supply / U256::from(10u64).pow(U256::from(*decimals))),
            _ => None,
        }
    }
}

/// Network-independent deployment parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployParams {
    pub token_supply: u64,
    pub token_decimals: u8,
    pub mint_fee: U256,
    pub btc_price: U256,
    pub doc_owner_index: usize,
    /// MoC address used on live networks.
    pub moc_address: Address,
    /// DOC address used on live networks.
    pub doc_address: Address,
}

impl Default for DeployParams {
    fn default() -> Self {
        Self {
            token_supply: DEFAULT_TOKEN_SUPPLY,
            token_decimals: DEFAULT_TOKEN_DECIMALS,
            mint_fee: U256::from(DEFAULT_MINT_FEE_WEI),
            btc_price: U256::from(DEFAULT_BTC_PRICE),
            doc_owner_index: DEFAULT_DOC_OWNER_INDEX,
            moc_address: TESTNET_MOC_ADDRESS,
            doc_address: TESTNET_DOC_ADDRESS,
        }
    }
}

impl DeployParams {
    /// Test token supply in base units.
    pub fn token_supply_units(&self) -> U256 {
        U256::from(self.token_supply) * U256::from(10u64).pow(U256::from(self.token_decimals))
    }
}

/// Ordered deployment steps for one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPlan {
    pub network: NetworkKind,
    pub steps: Vec<DeployStep>,
}

impl DeployPlan {
    /// Build the plan. `accounts` are the configured signers, in order.
    pub fn build(
        network: NetworkKind,
        params: &DeployParams,
        accounts: &[Address],
    ) -> Result<Self, DeployError> {
        let steps = match network {
            NetworkKind::Live => vec![
                DeployStep {
                    contract: ContractKind::Erc20Swap,
                    args: ConstructorArgs::None,
                },
                DeployStep {
                    contract: ContractKind::EtherSwap,
                    args: ConstructorArgs::EtherSwap {
                        moc: AddressArg::Fixed(params.moc_address),
                        doc: AddressArg::Fixed(params.doc_address),
                    },
                },
            ],
            NetworkKind::Local => {
                let owner = accounts.get(params.doc_owner_index).copied().ok_or(
                    DeployError::MissingAccount {
                        index: params.doc_owner_index,
                        available: accounts.len(),
                    },
                )?;
                // The dummy DOC stands in for both MoC and DOC.
                let dummy_doc = AddressArg::Deployed(ContractKind::DummyDocMintErc20);
                vec![
                    DeployStep {
                        contract: ContractKind::DummyDocMintErc20,
                        args: ConstructorArgs::DummyDoc {
                            owner,
                            mint_fee: params.mint_fee,
                            btc_price: params.btc_price,
                        },
                    },
                    DeployStep {
                        contract: ContractKind::TestErc20,
                        args: ConstructorArgs::Token {
                            name: TEST_TOKEN_NAME.to_string(),
                            symbol: TEST_TOKEN_SYMBOL.to_string(),
                            decimals: params.token_decimals,
                            supply: params.token_supply_units(),
                        },
                    },
                    DeployStep {
                        contract: ContractKind::Erc20Swap,
                        args: ConstructorArgs::None,
                    },
                    DeployStep {
                        contract: ContractKind::EtherSwap,
                        args: ConstructorArgs::EtherSwap {
                            moc: dummy_doc,
                            doc: dummy_doc,
                        },
                    },
                ]
            }
        };

        Ok(Self { network, steps })
    }

    pub fn contract_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.contract.name()).collect()
    }
}

/// One contract created during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedContract {
    pub contract: ContractKind,
    pub address: Address,
    pub tx_hash: TxHash,
    pub gas_used: U256,
    /// `gas_used * effective_gas_price`
    pub cost_wei: U256,
}

/// Outcome of a deployment run, persisted per network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub run_id: Uuid,
    pub network: String,
    pub chain_id: u64,
    pub deployer: Address,
    pub deployed_at: DateTime<Utc>,
    /// In deployment order.
    pub contracts: Vec<DeployedContract>,
    pub total_gas_cost_wei: U256,
    pub total_gas_cost_ether: String,
}

impl DeploymentRecord {
    pub fn address_of(&self, contract: ContractKind) -> Option<Address> {
        self.contracts
            .iter()
            .find(|c| c.contract == contract)
            .map(|c| c.address)
    }
}
