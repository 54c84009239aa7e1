//! Integration Tests - Deployment and Swap Lifecycle against a Mock Node
//!
//! Tests the interaction between usecases, ports, and mock adapters.
//! Uses mockall for trait mocking and tokio::test for async tests.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{address, Address, Bytes, Log, TxHash, B256, U256};
use alloy::sol_types::{SolCall, SolEvent, SolValue};
use mockall::mock;
use tokio_test::assert_ok;

use etherswap_tools::domain::abi::{ether_swap_args, IEtherSwap};
use etherswap_tools::domain::deployment::{
    ContractKind, DeployParams, DeployPlan, NetworkKind, TESTNET_DOC_ADDRESS, TESTNET_MOC_ADDRESS,
};
use etherswap_tools::domain::error::{ChainError, DeployError, ReceiptError, SwapError};
use etherswap_tools::domain::swap::{sats_to_wei, Preimage, SwapValues};
use etherswap_tools::ports::chain_client::{OutgoingTx, TxReceipt};
use etherswap_tools::usecases::{wait_for_receipt, Deployer, GasOracle, ReceiptPolicy, SwapChecker};

// ---- Mock Definitions ----

mock! {
    pub Chain {}

    #[async_trait::async_trait]
    impl etherswap_tools::ports::chain_client::ChainClient for Chain {
        fn accounts(&self) -> Vec<Address>;
        async fn chain_id(&self) -> anyhow::Result<u64>;
        async fn gas_price(&self) -> anyhow::Result<U256>;
        async fn block_number(&self) -> anyhow::Result<u64>;
        async fn balance(&self, address: Address) -> anyhow::Result<U256>;
        async fn code_at(&self, address: Address) -> anyhow::Result<Bytes>;
        async fn call(&self, to: Address, input: Bytes) -> anyhow::Result<Bytes>;
        async fn send(&self, tx: OutgoingTx) -> anyhow::Result<TxHash>;
        async fn receipt(&self, tx_hash: TxHash) -> anyhow::Result<Option<TxReceipt>>;
    }
}

mock! {
    pub Artifacts {}

    #[async_trait::async_trait]
    impl etherswap_tools::ports::artifacts::ArtifactSource for Artifacts {
        async fn bytecode(&self, contract: ContractKind) -> anyhow::Result<Bytes>;
    }
}

// ---- Fixtures ----

const CONTRACT: Address = address!("00000000000000000000000000000000000e7e55");
const GAS_USED: u64 = 1_000_000;
const GAS_PRICE: u64 = 60_000_000;

fn signers() -> Vec<Address> {
    (0xa0u8..0xa3).map(Address::with_last_byte).collect()
}

fn fast_policy() -> ReceiptPolicy {
    ReceiptPolicy {
        poll_interval: Duration::from_millis(1),
        timeout: Some(Duration::from_millis(200)),
        confirmations: 1,
    }
}

fn mined(tx_hash: TxHash, success: bool, logs: Vec<Log>) -> TxReceipt {
    TxReceipt {
        tx_hash,
        success,
        block_number: Some(100),
        gas_used: U256::from(GAS_USED),
        effective_gas_price: U256::from(GAS_PRICE),
        contract_address: None,
        logs,
    }
}

fn event_log<E: SolEvent>(event: &E) -> Log {
    Log {
        address: CONTRACT,
        data: event.encode_log_data(),
    }
}

fn artifacts() -> MockArtifacts {
    let mut artifacts = MockArtifacts::new();
    artifacts
        .expect_bytecode()
        .returning(|kind| Ok(Bytes::from(kind.name().as_bytes().to_vec())));
    artifacts
}

/// Chain where every creation is mined; tx `n` deploys to an address ending in `n`.
fn deploy_chain(sent: Arc<Mutex<Vec<OutgoingTx>>>) -> MockChain {
    let mut chain = MockChain::new();
    chain.expect_accounts().returning(signers);
    chain.expect_chain_id().returning(|| Ok(33));

    let nonce = Arc::new(AtomicU64::new(0));
    chain.expect_send().returning(move |tx| {
        sent.lock().unwrap().push(tx);
        let n = nonce.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(B256::with_last_byte(n as u8))
    });
    chain.expect_receipt().returning(|tx_hash| {
        let mut receipt = mined(tx_hash, true, Vec::new());
        receipt.contract_address = Some(Address::from_word(tx_hash));
        Ok(Some(receipt))
    });
    chain
}

fn swap_values() -> SwapValues {
    let preimage = Preimage::from_bytes([0x42; 32]);
    SwapValues {
        preimage_hash: preimage.hash(),
        amount: sats_to_wei(10_000),
        claim_address: signers()[1],
        refund_address: signers()[0],
        timelock: U256::from(250u64),
    }
}

/// `call` handler answering `version`, `hashValues` and `swaps`.
fn contract_views(
    values: SwapValues,
    locked: Arc<Mutex<bool>>,
) -> impl Fn(Address, Bytes) -> anyhow::Result<Bytes> + Send + 'static {
    move |_to, input| {
        let selector: [u8; 4] = input[..4].try_into()?;
        let output = if selector == IEtherSwap::versionCall::SELECTOR {
            U256::from(2u8).abi_encode()
        } else if selector == IEtherSwap::hashValuesCall::SELECTOR {
            values.hash_values().abi_encode()
        } else if selector == IEtherSwap::swapsCall::SELECTOR {
            (*locked.lock().unwrap()).abi_encode()
        } else {
            anyhow::bail!("unexpected call {selector:?}");
        };
        Ok(output.into())
    }
}

/// Balance reads return `before` first, then `after`.
fn balances(
    before: U256,
    after: U256,
) -> impl Fn(Address) -> anyhow::Result<U256> + Send + 'static {
    let reads = AtomicUsize::new(0);
    move |_| {
        if reads.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(before)
        } else {
            Ok(after)
        }
    }
}

// ---- Deployment ----

#[tokio::test]
async fn test_local_deploy_creates_four_contracts_in_order() {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let mut chain = deploy_chain(Arc::clone(&sent));
    chain.expect_gas_price().returning(|| Ok(U256::from(GAS_PRICE)));
    chain.expect_code_at().never();
    let chain = Arc::new(chain);

    let plan = DeployPlan::build(NetworkKind::Local, &DeployParams::default(), &signers()).unwrap();
    let deployer = Deployer::new(
        Arc::clone(&chain),
        Arc::new(artifacts()),
        GasOracle::new(Arc::clone(&chain), None),
        fast_policy(),
    );

    let record = deployer.deploy("regtest", &plan).await.unwrap();

    let order: Vec<ContractKind> = record.contracts.iter().map(|c| c.contract).collect();
    assert_eq!(order, ContractKind::ALL.to_vec());
    assert_eq!(record.chain_id, 33);
    assert_eq!(record.deployer, signers()[0]);
    assert_eq!(record.network, "regtest");

    // EtherSwap takes the dummy DOC as both MoC and DOC.
    let dummy_doc = record.address_of(ContractKind::DummyDocMintErc20).unwrap();
    assert_eq!(dummy_doc, Address::with_last_byte(1));
    let txs = sent.lock().unwrap();
    assert_eq!(txs.len(), 4);
    assert!(txs.iter().all(|tx| tx.to.is_none() && tx.from == signers()[0]));
    let mut expected = b"EtherSwap".to_vec();
    expected.extend_from_slice(&ether_swap_args(dummy_doc, dummy_doc));
    assert_eq!(txs[3].input, Bytes::from(expected));

    let per_tx = U256::from(GAS_USED) * U256::from(GAS_PRICE);
    assert_eq!(record.total_gas_cost_wei, per_tx * U256::from(4u8));
    assert_eq!(record.total_gas_cost_ether, "0.000240000000000000");
}

#[tokio::test]
async fn test_live_deploy_reuses_external_tokens() {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let mut chain = deploy_chain(Arc::clone(&sent));
    chain
        .expect_code_at()
        .times(2)
        .returning(|_| Ok(Bytes::from_static(&[0x60, 0x80])));
    let chain = Arc::new(chain);

    let plan =
        DeployPlan::build(NetworkKind::Live, &DeployParams::default(), &signers()[..1]).unwrap();
    let deployer = Deployer::new(
        Arc::clone(&chain),
        Arc::new(artifacts()),
        GasOracle::new(Arc::clone(&chain), Some(GAS_PRICE)),
        fast_policy(),
    );

    let record = deployer.deploy("testnet", &plan).await.unwrap();

    assert_eq!(
        record.contracts.iter().map(|c| c.contract).collect::<Vec<_>>(),
        vec![ContractKind::Erc20Swap, ContractKind::EtherSwap]
    );
    let txs = sent.lock().unwrap();
    assert!(txs[1].input.ends_with(&ether_swap_args(TESTNET_MOC_ADDRESS, TESTNET_DOC_ADDRESS)));
}

#[tokio::test]
async fn test_live_deploy_refuses_missing_external_code() {
    let mut chain = MockChain::new();
    chain.expect_accounts().returning(signers);
    chain.expect_code_at().returning(|_| Ok(Bytes::new()));
    chain.expect_send().never();
    let chain = Arc::new(chain);

    let plan = DeployPlan::build(NetworkKind::Live, &DeployParams::default(), &signers()).unwrap();
    let deployer = Deployer::new(
        Arc::clone(&chain),
        Arc::new(MockArtifacts::new()),
        GasOracle::new(Arc::clone(&chain), Some(GAS_PRICE)),
        fast_policy(),
    );

    let err = deployer.deploy("mainnet", &plan).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::MissingExternalCode { name: "MoC", .. })
    ));
}

#[tokio::test]
async fn test_reverted_deployment_stops_the_run() {
    let mut chain = MockChain::new();
    chain.expect_accounts().returning(signers);
    chain
        .expect_send()
        .times(1)
        .returning(|_| Ok(B256::with_last_byte(9)));
    chain
        .expect_receipt()
        .returning(|tx_hash| Ok(Some(mined(tx_hash, false, Vec::new()))));
    let chain = Arc::new(chain);

    let plan = DeployPlan::build(NetworkKind::Local, &DeployParams::default(), &signers()).unwrap();
    let deployer = Deployer::new(
        Arc::clone(&chain),
        Arc::new(artifacts()),
        GasOracle::new(Arc::clone(&chain), Some(GAS_PRICE)),
        fast_policy(),
    );

    let err = deployer.deploy("regtest", &plan).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::Reverted {
            contract: ContractKind::DummyDocMintErc20,
            ..
        })
    ));
}

// ---- Receipt polling ----

#[tokio::test]
async fn test_wait_for_receipt_polls_until_mined() {
    let polls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&polls);
    let mut chain = MockChain::new();
    chain.expect_receipt().returning(move |tx_hash| {
        if counter.fetch_add(1, Ordering::SeqCst) < 2 {
            Ok(None)
        } else {
            Ok(Some(mined(tx_hash, true, Vec::new())))
        }
    });

    let tx_hash = B256::with_last_byte(1);
    let receipt = wait_for_receipt(&chain, tx_hash, fast_policy()).await.unwrap();
    assert_eq!(receipt.tx_hash, tx_hash);
    assert_eq!(polls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_wait_for_receipt_times_out() {
    let mut chain = MockChain::new();
    chain.expect_receipt().returning(|_| Ok(None));

    let policy = ReceiptPolicy {
        timeout: Some(Duration::from_millis(5)),
        ..fast_policy()
    };
    let err = wait_for_receipt(&chain, B256::with_last_byte(1), policy)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ReceiptError>(),
        Some(ReceiptError::Timeout { .. })
    ));
}

#[tokio::test]
async fn test_wait_for_receipt_waits_for_confirmations() {
    let heads = Arc::new(AtomicU64::new(100));
    let head = Arc::clone(&heads);
    let mut chain = MockChain::new();
    chain
        .expect_receipt()
        .returning(|tx_hash| Ok(Some(mined(tx_hash, true, Vec::new()))));
    chain
        .expect_block_number()
        .returning(move || Ok(head.fetch_add(1, Ordering::SeqCst)));

    let policy = fast_policy().with_confirmations(3);
    wait_for_receipt(&chain, B256::with_last_byte(1), policy)
        .await
        .unwrap();

    // Mined at 100, confirmed once the head reaches 102.
    assert_eq!(heads.load(Ordering::SeqCst), 103);
}

// ---- Swap lifecycle ----

#[tokio::test]
async fn test_lock_verifies_balance_event_and_mapping() {
    let values = swap_values();
    let locked = Arc::new(Mutex::new(false));

    let mut chain = MockChain::new();
    chain
        .expect_balance()
        .returning(balances(U256::ZERO, values.amount));
    let flag = Arc::clone(&locked);
    chain.expect_send().times(1).returning(move |tx| {
        assert_eq!(tx.from, values.refund_address);
        assert_eq!(tx.value, values.amount);
        assert_eq!(&tx.input[..4], &IEtherSwap::lockCall::SELECTOR[..]);
        *flag.lock().unwrap() = true;
        Ok(B256::with_last_byte(7))
    });
    chain.expect_receipt().returning(move |tx_hash| {
        let lockup = IEtherSwap::Lockup {
            preimageHash: values.preimage_hash,
            amount: values.amount,
            claimAddress: values.claim_address,
            refundAddress: values.refund_address,
            timelock: values.timelock,
        };
        Ok(Some(mined(tx_hash, true, vec![event_log(&lockup)])))
    });
    chain
        .expect_call()
        .returning(contract_views(values, Arc::clone(&locked)));

    let checker = SwapChecker::new(Arc::new(chain), CONTRACT, fast_policy());
    let outcome = checker.lock(&values).await.unwrap();
    assert_eq!(outcome.tx_hash, B256::with_last_byte(7));
}

#[tokio::test]
async fn test_lock_detects_balance_mismatch() {
    let values = swap_values();

    let mut chain = MockChain::new();
    chain
        .expect_balance()
        .returning(balances(U256::ZERO, values.amount - U256::from(1u8)));
    chain
        .expect_send()
        .returning(|_| Ok(B256::with_last_byte(7)));
    chain
        .expect_receipt()
        .returning(|tx_hash| Ok(Some(mined(tx_hash, true, Vec::new()))));

    let checker = SwapChecker::new(Arc::new(chain), CONTRACT, fast_policy());
    let err = checker.lock(&values).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SwapError>(),
        Some(SwapError::Assertion {
            check: "lockup balance",
            ..
        })
    ));
}

#[tokio::test]
async fn test_lock_requires_lockup_event_from_contract() {
    let values = swap_values();

    let mut chain = MockChain::new();
    chain
        .expect_balance()
        .returning(balances(U256::ZERO, values.amount));
    chain
        .expect_send()
        .returning(|_| Ok(B256::with_last_byte(7)));
    chain.expect_receipt().returning(move |tx_hash| {
        // Right event, wrong emitter.
        let mut log = event_log(&IEtherSwap::Refund {
            preimageHash: values.preimage_hash,
        });
        log.address = Address::with_last_byte(0xff);
        Ok(Some(mined(tx_hash, true, vec![log])))
    });

    let checker = SwapChecker::new(Arc::new(chain), CONTRACT, fast_policy());
    let err = checker.lock(&values).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SwapError>(),
        Some(SwapError::MissingEvent { check: "lockup", .. })
    ));
}

#[tokio::test]
async fn test_claim_with_wrong_preimage_sends_nothing() {
    let values = swap_values();
    let mut chain = MockChain::new();
    chain.expect_send().never();

    let checker = SwapChecker::new(Arc::new(chain), CONTRACT, fast_policy());
    let wrong = Preimage::from_bytes([0x43; 32]);
    let err = checker
        .claim(&wrong, &values, values.claim_address, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SwapError>(),
        Some(SwapError::Assertion {
            check: "claim preimage",
            ..
        })
    ));
}

#[tokio::test]
async fn test_claim_checks_event_and_clears_mapping() {
    let values = swap_values();
    let preimage = Preimage::from_bytes([0x42; 32]);

    let mut chain = MockChain::new();
    chain.expect_send().times(1).returning(move |tx| {
        assert_eq!(tx.from, values.claim_address);
        assert_eq!(tx.gas_limit, Some(100_000));
        Ok(B256::with_last_byte(8))
    });
    chain.expect_receipt().returning(move |tx_hash| {
        let claim = IEtherSwap::Claim {
            preimageHash: preimage.hash(),
            preimage: preimage.as_b256(),
        };
        Ok(Some(mined(tx_hash, true, vec![event_log(&claim)])))
    });
    chain
        .expect_call()
        .returning(contract_views(values, Arc::new(Mutex::new(false))));

    let checker = SwapChecker::new(Arc::new(chain), CONTRACT, fast_policy());
    let outcome = checker
        .claim(&preimage, &values, values.claim_address, Some(100_000))
        .await
        .unwrap();
    assert_eq!(outcome.tx_hash, B256::with_last_byte(8));
}

#[tokio::test]
async fn test_claim_revert_is_reported() {
    let values = swap_values();
    let preimage = Preimage::from_bytes([0x42; 32]);

    let mut chain = MockChain::new();
    chain
        .expect_send()
        .returning(|_| Ok(B256::with_last_byte(8)));
    chain
        .expect_receipt()
        .returning(|tx_hash| Ok(Some(mined(tx_hash, false, Vec::new()))));

    let checker = SwapChecker::new(Arc::new(chain), CONTRACT, fast_policy());
    let err = checker
        .claim(&preimage, &values, values.claim_address, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SwapError>(),
        Some(SwapError::Reverted(_))
    ));
}

#[tokio::test]
async fn test_refund_verifies_balance_decrease() {
    let values = swap_values();

    let mut chain = MockChain::new();
    chain.expect_block_number().returning(|| Ok(300));
    chain
        .expect_balance()
        .returning(balances(values.amount, U256::ZERO));
    chain.expect_send().times(1).returning(move |tx| {
        assert_eq!(tx.from, values.refund_address);
        assert_eq!(&tx.input[..4], &IEtherSwap::refundCall::SELECTOR[..]);
        Ok(B256::with_last_byte(9))
    });
    chain.expect_receipt().returning(move |tx_hash| {
        let refund = IEtherSwap::Refund {
            preimageHash: values.preimage_hash,
        };
        Ok(Some(mined(tx_hash, true, vec![event_log(&refund)])))
    });
    chain
        .expect_call()
        .returning(contract_views(values, Arc::new(Mutex::new(false))));

    let checker = SwapChecker::new(Arc::new(chain), CONTRACT, fast_policy());
    assert_ok!(checker.refund(&values, None).await);
}

#[tokio::test]
async fn test_plain_ether_rejected_at_estimation() {
    let mut chain = MockChain::new();
    chain
        .expect_send()
        .returning(|_| Err(ChainError::ExecutionReverted("execution reverted".into()).into()));
    chain.expect_receipt().never();

    let checker = SwapChecker::new(Arc::new(chain), CONTRACT, fast_policy());
    assert_ok!(checker.check_rejects_plain_ether(signers()[0]).await);
}

#[tokio::test]
async fn test_plain_ether_transport_failure_is_not_a_rejection() {
    let mut chain = MockChain::new();
    chain
        .expect_send()
        .returning(|_| Err(anyhow::anyhow!("error sending request: connection refused")));
    chain.expect_receipt().never();

    let checker = SwapChecker::new(Arc::new(chain), CONTRACT, fast_policy());
    let err = checker
        .check_rejects_plain_ether(signers()[0])
        .await
        .unwrap_err();
    assert!(err.downcast_ref::<ChainError>().is_none());
    assert!(format!("{err:#}").contains("connection refused"));
}

#[tokio::test]
async fn test_plain_ether_accepted_fails_check() {
    let mut chain = MockChain::new();
    chain.expect_send().returning(|tx| {
        assert!(tx.input.is_empty());
        assert_eq!(tx.value, U256::from(10u64).pow(U256::from(18u8)));
        Ok(B256::with_last_byte(3))
    });
    chain
        .expect_receipt()
        .returning(|tx_hash| Ok(Some(mined(tx_hash, true, Vec::new()))));

    let checker = SwapChecker::new(Arc::new(chain), CONTRACT, fast_policy());
    let err = checker
        .check_rejects_plain_ether(signers()[0])
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SwapError>(),
        Some(SwapError::Assertion {
            check: "plain ether transfer",
            ..
        })
    ));
}

#[tokio::test]
async fn test_version_mismatch() {
    let mut chain = MockChain::new();
    chain
        .expect_call()
        .returning(contract_views(swap_values(), Arc::new(Mutex::new(false))));

    let checker = SwapChecker::new(Arc::new(chain), CONTRACT, fast_policy());
    assert_ok!(checker.check_version(2).await);
    let err = checker.check_version(3).await.unwrap_err();
    assert!(err.to_string().contains("version"));
}

#[tokio::test]
async fn test_full_suite_runs_in_order() {
    let preimage = Preimage::from_bytes([0x42; 32]);
    let values = swap_values();
    let locked = Arc::new(Mutex::new(false));

    let mut chain = MockChain::new();
    chain
        .expect_code_at()
        .returning(|_| Ok(Bytes::from_static(&[0x60])));
    chain
        .expect_call()
        .returning(contract_views(values, Arc::clone(&locked)));
    chain
        .expect_balance()
        .returning(balances(U256::ZERO, values.amount));

    // Sends: plain ether (rejected), lock = tx 1, claim = tx 2.
    let sends = AtomicUsize::new(0);
    let flag = Arc::clone(&locked);
    chain.expect_send().returning(move |_| {
        let n = sends.fetch_add(1, Ordering::SeqCst);
        match n {
            0 => return Err(ChainError::ExecutionReverted("transaction reverted".into()).into()),
            1 => *flag.lock().unwrap() = true,
            _ => *flag.lock().unwrap() = false,
        }
        Ok(B256::with_last_byte(n as u8))
    });
    chain.expect_receipt().returning(move |tx_hash| {
        let log = if tx_hash == B256::with_last_byte(1) {
            event_log(&IEtherSwap::Lockup {
                preimageHash: values.preimage_hash,
                amount: values.amount,
                claimAddress: values.claim_address,
                refundAddress: values.refund_address,
                timelock: values.timelock,
            })
        } else {
            event_log(&IEtherSwap::Claim {
                preimageHash: preimage.hash(),
                preimage: preimage.as_b256(),
            })
        };
        Ok(Some(mined(tx_hash, true, vec![log])))
    });

    let checker = SwapChecker::new(Arc::new(chain), CONTRACT, fast_policy());
    let report = checker
        .run_suite(2, &preimage, &values, values.claim_address, None)
        .await
        .unwrap();

    assert_eq!(
        report.passed,
        vec!["version", "rejects plain ether", "hash values", "lock", "claim"]
    );
    assert_eq!(report.swap_id, values.hash_values());
    assert!(!*locked.lock().unwrap());
}

#[tokio::test]
async fn test_hash_values_mismatch() {
    let values = swap_values();
    let mut chain = MockChain::new();
    chain
        .expect_call()
        .returning(|_, _| Ok(B256::with_last_byte(0xbb).abi_encode().into()));

    let checker = SwapChecker::new(Arc::new(chain), CONTRACT, fast_policy());
    let err = checker.check_hash_values(&values).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SwapError>(),
        Some(SwapError::Assertion {
            check: "hash values",
            ..
        })
    ));
}

#[tokio::test]
async fn test_refund_detects_balance_mismatch() {
    let values = swap_values();

    let mut chain = MockChain::new();
    chain.expect_block_number().returning(|| Ok(300));
    chain
        .expect_balance()
        .returning(balances(values.amount, values.amount));
    chain
        .expect_send()
        .returning(|_| Ok(B256::with_last_byte(9)));
    chain
        .expect_receipt()
        .returning(|tx_hash| Ok(Some(mined(tx_hash, true, Vec::new()))));

    let checker = SwapChecker::new(Arc::new(chain), CONTRACT, fast_policy());
    let err = checker.refund(&values, None).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SwapError>(),
        Some(SwapError::Assertion {
            check: "refund balance",
            ..
        })
    ));
}

#[tokio::test]
async fn test_refund_requires_refund_event() {
    let values = swap_values();

    let mut chain = MockChain::new();
    chain.expect_block_number().returning(|| Ok(300));
    chain
        .expect_balance()
        .returning(balances(values.amount, U256::ZERO));
    chain
        .expect_send()
        .returning(|_| Ok(B256::with_last_byte(9)));
    chain
        .expect_receipt()
        .returning(|tx_hash| Ok(Some(mined(tx_hash, true, Vec::new()))));

    let checker = SwapChecker::new(Arc::new(chain), CONTRACT, fast_policy());
    let err = checker.refund(&values, None).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SwapError>(),
        Some(SwapError::MissingEvent { check: "refund", .. })
    ));
}

#[tokio::test]
async fn test_claim_detects_swap_still_locked() {
    let values = swap_values();
    let preimage = Preimage::from_bytes([0x42; 32]);

    let mut chain = MockChain::new();
    chain
        .expect_send()
        .returning(|_| Ok(B256::with_last_byte(8)));
    chain.expect_receipt().returning(move |tx_hash| {
        let claim = IEtherSwap::Claim {
            preimageHash: preimage.hash(),
            preimage: preimage.as_b256(),
        };
        Ok(Some(mined(tx_hash, true, vec![event_log(&claim)])))
    });
    chain
        .expect_call()
        .returning(contract_views(values, Arc::new(Mutex::new(true))));

    let checker = SwapChecker::new(Arc::new(chain), CONTRACT, fast_policy());
    let err = checker
        .claim(&preimage, &values, values.claim_address, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SwapError>(),
        Some(SwapError::Assertion {
            check: "claim mapping",
            ..
        })
    ));
}

#[tokio::test]
async fn test_deployment_without_contract_address_stops_the_run() {
    let mut chain = MockChain::new();
    chain.expect_accounts().returning(signers);
    chain
        .expect_send()
        .times(1)
        .returning(|_| Ok(B256::with_last_byte(5)));
    chain
        .expect_receipt()
        .returning(|tx_hash| Ok(Some(mined(tx_hash, true, Vec::new()))));
    let chain = Arc::new(chain);

    let plan = DeployPlan::build(NetworkKind::Local, &DeployParams::default(), &signers()).unwrap();
    let deployer = Deployer::new(
        Arc::clone(&chain),
        Arc::new(artifacts()),
        GasOracle::new(Arc::clone(&chain), Some(GAS_PRICE)),
        fast_policy(),
    );

    let err = deployer.deploy("regtest", &plan).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DeployError>(),
        Some(DeployError::NoContractAddress {
            contract: ContractKind::DummyDocMintErc20,
            ..
        })
    ));
}
