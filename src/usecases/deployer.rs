//! Deployment Orchestrator - Ordered Contract Creation
//!
//! Runs a `DeployPlan` step by step:
//! 1. Load creation code and append the encoded constructor arguments
//! 2. Broadcast the creation transaction from the deployer account
//! 3. Poll for the receipt and add its cost to the gas tally
//! 4. Remember the address for later steps that reference it
//!
//! Steps are strictly sequential: `EtherSwap` needs the token address
//! produced by an earlier step.

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::{Address, Bytes};
use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::deployment::{
    AddressArg, ConstructorArgs, ContractKind, DeployPlan, DeployStep, DeployedContract,
    DeploymentRecord, NetworkKind,
};
use crate::domain::error::DeployError;
use crate::domain::gas::{format_ether, GasTally};
use crate::ports::artifacts::ArtifactSource;
use crate::ports::chain_client::{ChainClient, OutgoingTx};

use super::gas_oracle::GasOracle;
use super::receipts::{wait_for_receipt, ReceiptPolicy};
use super::validator::ContractValidator;

/// Deploys the swap contracts for one network.
pub struct Deployer<C: ChainClient + ?Sized, A: ArtifactSource + ?Sized> {
    client: Arc<C>,
    artifacts: Arc<A>,
    gas_oracle: GasOracle<C>,
    receipts: ReceiptPolicy,
}

impl<C: ChainClient + ?Sized, A: ArtifactSource + ?Sized> Deployer<C, A> {
    pub fn new(
        client: Arc<C>,
        artifacts: Arc<A>,
        gas_oracle: GasOracle<C>,
        receipts: ReceiptPolicy,
    ) -> Self {
        Self {
            client,
            artifacts,
            gas_oracle,
            receipts,
        }
    }

    /// Execute `plan` on `network` and return the deployment record.
    ///
    /// The first configured account pays for every deployment.
    #[instrument(skip(self, plan), fields(network = %network))]
    pub async fn deploy(&self, network: &str, plan: &DeployPlan) -> Result<DeploymentRecord> {
        let accounts = self.client.accounts();
        let deployer = accounts.first().copied().ok_or(DeployError::MissingAccount {
            index: 0,
            available: 0,
        })?;

        let gas_price_gwei = self.gas_oracle.gas_price_gwei().await?;
        info!(
            %deployer,
            network,
            %gas_price_gwei,
            contracts = %plan.contract_names().join(", "),
            "Deploying contracts"
        );

        if plan.network == NetworkKind::Live {
            self.check_external_contracts(plan).await?;
        }

        let mut deployed: HashMap<ContractKind, Address> = HashMap::new();
        let mut tally = GasTally::new();
        let mut contracts = Vec::with_capacity(plan.steps.len());

        for step in &plan.steps {
            let contract = self
                .deploy_step(step, deployer, &deployed, &mut tally)
                .await?;
            deployed.insert(contract.contract, contract.address);
            contracts.push(contract);
        }

        info!(
            gas_cost_ether = %tally.total_ether(),
            transactions = tally.transactions(),
            "Gas cost"
        );

        let chain_id = self.client.chain_id().await?;

        Ok(DeploymentRecord {
            run_id: Uuid::new_v4(),
            network: network.to_string(),
            chain_id,
            deployer,
            deployed_at: Utc::now(),
            contracts,
            total_gas_cost_wei: tally.total_wei(),
            total_gas_cost_ether: tally.total_ether(),
        })
    }

    /// Create one contract and wait for it to be mined.
    #[instrument(skip_all, fields(contract = %step.contract))]
    async fn deploy_step(
        &self,
        step: &DeployStep,
        deployer: Address,
        deployed: &HashMap<ContractKind, Address>,
        tally: &mut GasTally,
    ) -> Result<DeployedContract> {
        match step.whole_token_supply() {
            Some(supply) => info!(contract = %step.contract, %supply, "Deploying"),
            None => info!(contract = %step.contract, "Deploying"),
        }

        let code = self.creation_code(step, deployed).await?;
        let tx_hash = self
            .client
            .send(OutgoingTx::create(deployer, code))
            .await
            .with_context(|| format!("Failed to send deployment of {}", step.contract))?;
        info!(contract = %step.contract, %tx_hash, "Transaction");

        let receipt = wait_for_receipt(self.client.as_ref(), tx_hash, self.receipts).await?;

        if !receipt.success {
            return Err(DeployError::Reverted {
                contract: step.contract,
                tx_hash,
            }
            .into());
        }

        let address = receipt
            .contract_address
            .ok_or(DeployError::NoContractAddress {
                contract: step.contract,
                tx_hash,
            })?;

        let cost_wei = tally.record(receipt.gas_used, receipt.effective_gas_price);
        info!(
            contract = %step.contract,
            %address,
            gas_used = %receipt.gas_used,
            cost_ether = %format_ether(cost_wei),
            "Address"
        );

        Ok(DeployedContract {
            contract: step.contract,
            address,
            tx_hash,
            gas_used: receipt.gas_used,
            cost_wei,
        })
    }

    /// Creation code followed by the ABI-encoded constructor arguments.
    async fn creation_code(
        &self,
        step: &DeployStep,
        deployed: &HashMap<ContractKind, Address>,
    ) -> Result<Bytes> {
        let bytecode = self.artifacts.bytecode(step.contract).await?;
        let args = step.args.encode(deployed)?;

        let mut code = Vec::with_capacity(bytecode.len() + args.len());
        code.extend_from_slice(&bytecode);
        code.extend_from_slice(&args);
        Ok(code.into())
    }

    /// Live networks reuse external MoC/DOC contracts; they must exist.
    async fn check_external_contracts(&self, plan: &DeployPlan) -> Result<()> {
        let validator = ContractValidator::new(Arc::clone(&self.client));

        for step in &plan.steps {
            if let ConstructorArgs::EtherSwap {
                moc: AddressArg::Fixed(moc),
                doc: AddressArg::Fixed(doc),
            } = step.args
            {
                let externals = [("MoC", moc), ("DOC", doc)];
                let results = validator.validate_all(&externals).await?;
                if let Some((name, address)) = externals
                    .iter()
                    .zip(&results)
                    .find_map(|(external, result)| (!result.has_code).then_some(*external))
                {
                    return Err(DeployError::MissingExternalCode {
                        name,
                        address: address.to_string(),
                    }
                    .into());
                }
            }
        }

        Ok(())
    }
}
