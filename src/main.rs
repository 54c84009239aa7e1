//! EtherSwap Tools - Entry Point
//!
//! Deploys the swap contracts and drives an `EtherSwap` through its
//! lock / claim / refund lifecycle.
//!
//! Wiring sequence:
//! 1. Parse the command line, load + validate `etherswap.toml`
//! 2. Init tracing (JSON structured logging, `--log-format pretty` for humans)
//! 3. Load signing keys from `ETHERSWAP_PRIVATE_KEYS`
//! 4. Connect to the selected network's JSON-RPC endpoint
//! 5. Run the command

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use alloy::primitives::{Address, B256, U256};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use etherswap_tools::adapters::chain::{ArtifactStore, RpcChainClient, Signers};
use etherswap_tools::adapters::persistence::DeploymentStore;
use etherswap_tools::config::{self, AppConfig, NetworkConfig};
use etherswap_tools::domain::deployment::{ContractKind, DeployPlan, NetworkKind};
use etherswap_tools::domain::{Amount, Preimage, SwapValues};
use etherswap_tools::ports::ChainClient;
use etherswap_tools::usecases::{Deployer, GasOracle, ReceiptPolicy, SwapChecker};

/// Reverse swaps claim with a fixed gas limit when none is configured.
const REVERSE_SWAP_CLAIM_GAS: u64 = 100_000;

/// EtherSwap deployment and swap lifecycle tool
#[derive(Parser, Debug)]
#[command(name = "etherswap")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = "etherswap.toml")]
    config: String,

    /// Network section of the configuration to use
    #[arg(long, global = true, default_value = "regtest")]
    network: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Deploy the swap contracts (and test tokens on local networks)
    Deploy,

    /// Generate a random preimage and print it with its hash
    Preimage,

    /// Compare the contract's hashValues with the local commitment
    Hash(SwapArgs),

    /// Whether a swap is currently locked
    Query(SwapArgs),

    /// Lock coins from the sender account
    Lock(SwapArgs),

    /// Claim a locked swap with its preimage
    Claim {
        #[command(flatten)]
        swap: SwapArgs,

        /// Gas limit (defaults to the configured claim gas limit)
        #[arg(long)]
        gas_limit: Option<u64>,

        /// Use the fixed reverse swap gas limit
        #[arg(long, default_value_t = false)]
        reverse: bool,
    },

    /// Refund a timed out swap to the sender account
    Refund {
        #[command(flatten)]
        swap: SwapArgs,

        /// Gas limit (estimated by the node when unset)
        #[arg(long)]
        gas_limit: Option<u64>,
    },

    /// Run version, plain ether, hash, lock and claim checks in order
    Verify {
        /// Swap amount: `<n>sat`, `<n>wei` or decimal coins
        #[arg(long, default_value = "10000sat")]
        amount: Amount,

        /// Preimage to use (random when unset)
        #[arg(long)]
        preimage: Option<Preimage>,

        /// Timelock distance from the current block
        #[arg(long, default_value_t = 100)]
        timelock_blocks: u64,

        /// EtherSwap address
        #[arg(long)]
        contract: Option<Address>,
    },
}

/// The values identifying one swap.
#[derive(Args, Debug)]
struct SwapArgs {
    /// EtherSwap address (overrides config and deployment record)
    #[arg(long)]
    contract: Option<Address>,

    /// sha256 of the preimage
    #[arg(long)]
    preimage_hash: Option<B256>,

    /// 32 byte hex preimage; its hash is used when --preimage-hash is unset
    #[arg(long)]
    preimage: Option<Preimage>,

    /// Swap amount: `<n>sat`, `<n>wei` or decimal coins
    #[arg(long)]
    amount: Amount,

    /// Claim address (defaults to signer 1)
    #[arg(long)]
    claim_address: Option<Address>,

    /// Refund address (defaults to signer 0)
    #[arg(long)]
    refund_address: Option<Address>,

    /// Absolute timelock block height
    #[arg(long)]
    timelock: Option<u64>,

    /// Timelock distance from the current block, used when --timelock is unset
    #[arg(long)]
    timelock_blocks: Option<u64>,
}

impl SwapArgs {
    async fn values<C: ChainClient + ?Sized>(&self, client: &C) -> Result<SwapValues> {
        let preimage_hash = match (self.preimage_hash, &self.preimage) {
            (Some(hash), _) => hash,
            (None, Some(preimage)) => preimage.hash(),
            (None, None) => anyhow::bail!("Either --preimage-hash or --preimage is required"),
        };

        let timelock = match (self.timelock, self.timelock_blocks) {
            (Some(timelock), _) => timelock,
            (None, Some(blocks)) => client.block_number().await? + blocks,
            (None, None) => anyhow::bail!("Either --timelock or --timelock-blocks is required"),
        };

        let accounts = client.accounts();
        Ok(SwapValues {
            preimage_hash,
            amount: self.amount.wei(),
            claim_address: resolve_account(self.claim_address, &accounts, 1)?,
            refund_address: resolve_account(self.refund_address, &accounts, 0)?,
            timelock: U256::from(timelock),
        })
    }
}

fn resolve_account(
    explicit: Option<Address>,
    accounts: &[Address],
    index: usize,
) -> Result<Address> {
    match explicit {
        Some(address) => Ok(address),
        None => accounts.get(index).copied().with_context(|| {
            format!(
                "No address given and signer {index} is not configured ({} available)",
                accounts.len()
            )
        }),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── 1. Load configuration ───────────────────────────────
    let config =
        config::loader::load_config(&cli.config).context("Failed to load configuration")?;

    // ── 2. Initialize structured logging ────────────────────
    init_tracing(&config.app.log_level, cli.log_format);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        network = %cli.network,
        "Starting etherswap"
    );

    // Needs neither keys nor a node.
    if let Commands::Preimage = cli.command {
        let preimage = Preimage::random();
        println!("Preimage: {preimage}");
        println!("Preimage hash: {}", preimage.hash());
        return Ok(());
    }

    // ── 3. Signers + RPC connection ─────────────────────────
    let network = config.network(&cli.network)?;
    let signers = Signers::from_env().context("Failed to load signing keys")?;
    let client = Arc::new(
        RpcChainClient::connect(network, signers)
            .await
            .context("Failed to connect to network")?,
    );

    // ── 4. Run the command ──────────────────────────────────
    match cli.command {
        Commands::Preimage => Ok(()),
        Commands::Deploy => deploy(&config, &cli.network, network, client).await,
        Commands::Hash(args) => {
            let checker = checker(&config, &cli.network, network, &client, args.contract).await?;
            let values = args.values(client.as_ref()).await?;
            let swap_id = checker.check_hash_values(&values).await?;
            println!("Swap hash: {swap_id}");
            Ok(())
        }
        Commands::Query(args) => {
            let checker = checker(&config, &cli.network, network, &client, args.contract).await?;
            let values = args.values(client.as_ref()).await?;
            let locked = checker.is_locked(&values).await?;
            println!("Swap {} locked: {locked}", values.hash_values());
            Ok(())
        }
        Commands::Lock(args) => {
            let checker = checker(&config, &cli.network, network, &client, args.contract).await?;
            let values = args.values(client.as_ref()).await?;
            let outcome = checker.lock(&values).await?;
            println!("Locked {} in {}", args.amount, outcome.tx_hash);
            println!("Timelock: {}", values.timelock);
            Ok(())
        }
        Commands::Claim {
            swap,
            gas_limit,
            reverse,
        } => {
            let preimage = swap
                .preimage
                .context("--preimage is required to claim")?;
            let checker = checker(&config, &cli.network, network, &client, swap.contract).await?;
            let values = swap.values(client.as_ref()).await?;
            let gas_limit = gas_limit
                .or_else(|| reverse.then_some(REVERSE_SWAP_CLAIM_GAS))
                .or(config.swap.claim_gas_limit);
            let outcome = checker
                .claim(&preimage, &values, values.claim_address, gas_limit)
                .await?;
            println!("Claimed in {}", outcome.tx_hash);
            Ok(())
        }
        Commands::Refund { swap, gas_limit } => {
            let checker = checker(&config, &cli.network, network, &client, swap.contract).await?;
            let values = swap.values(client.as_ref()).await?;
            let outcome = checker.refund(&values, gas_limit).await?;
            println!("Refunded in {}", outcome.tx_hash);
            Ok(())
        }
        Commands::Verify {
            amount,
            preimage,
            timelock_blocks,
            contract,
        } => {
            let checker = checker(&config, &cli.network, network, &client, contract).await?;
            let accounts = client.accounts();
            let preimage = preimage.unwrap_or_else(Preimage::random);
            let timelock = client.block_number().await? + timelock_blocks;
            let values = SwapValues {
                preimage_hash: preimage.hash(),
                amount: amount.wei(),
                claim_address: resolve_account(None, &accounts, 1)?,
                refund_address: resolve_account(None, &accounts, 0)?,
                timelock: U256::from(timelock),
            };

            let report = checker
                .run_suite(
                    config.swap.expected_version,
                    &preimage,
                    &values,
                    values.claim_address,
                    config.swap.claim_gas_limit,
                )
                .await?;

            for check in &report.passed {
                println!("ok - {check}");
            }
            println!("Swap hash: {}", report.swap_id);
            println!("Lock tx: {}", report.lock.tx_hash);
            println!("Claim tx: {}", report.claim.tx_hash);
            Ok(())
        }
    }
}

fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

fn receipt_policy(network: &NetworkConfig) -> ReceiptPolicy {
    ReceiptPolicy {
        poll_interval: network.receipt_poll_interval(),
        timeout: network.receipt_timeout(),
        ..ReceiptPolicy::default()
    }
}

async fn deploy(
    config: &AppConfig,
    network_name: &str,
    network: &NetworkConfig,
    client: Arc<RpcChainClient>,
) -> Result<()> {
    let kind = NetworkKind::from_name(network_name);
    let params = config.deploy_params(network)?;
    let plan = DeployPlan::build(kind, &params, &client.accounts())?;

    let artifacts = Arc::new(ArtifactStore::new(&config.app.artifacts_dir));
    let gas_oracle = GasOracle::new(Arc::clone(&client), network.gas_price);
    let deployer = Deployer::new(
        Arc::clone(&client),
        artifacts,
        gas_oracle,
        receipt_policy(network),
    );

    // Created before any gas is spent so a bad directory fails the run early.
    let store = DeploymentStore::new(&config.app.deployments_dir).await?;

    let record = deployer.deploy(network_name, &plan).await?;
    let path = store.save(&record).await?;

    for contract in &record.contracts {
        println!("{}: {}", contract.contract, contract.address);
    }
    println!("Gas cost: {} ether", record.total_gas_cost_ether);
    println!("Record: {}", path.display());
    Ok(())
}

/// Attach to the EtherSwap: CLI address, else config, else the deployment record.
async fn checker(
    config: &AppConfig,
    network_name: &str,
    network: &NetworkConfig,
    client: &Arc<RpcChainClient>,
    explicit: Option<Address>,
) -> Result<SwapChecker<RpcChainClient>> {
    let address = match explicit.or(config.swap.contract_address()?) {
        Some(address) => address,
        None => {
            let store = DeploymentStore::new(&config.app.deployments_dir).await?;
            store
                .load(network_name)
                .await?
                .and_then(|record| record.address_of(ContractKind::EtherSwap))
                .with_context(|| {
                    format!(
                        "No EtherSwap address given and no deployment record for '{network_name}'"
                    )
                })?
        }
    };

    let policy = receipt_policy(network).with_confirmations(config.swap.confirmations);
    let checker = SwapChecker::new(Arc::clone(client), address, policy);
    checker.ensure_deployed().await?;
    info!(%address, "Using EtherSwap");
    Ok(checker)
}
