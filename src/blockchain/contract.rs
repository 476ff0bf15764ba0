// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! BankBlockchain contract handle.
//!
//! [`BankLedger`] is the seam the wallet session talks to. The RPC backend
//! below drives a deployed contract through alloy; the in-process backend in
//! [`super::memory`] reproduces the same rules without a node.

use alloy::{
    primitives::{Address, U256},
    providers::DynProvider,
    sol,
};
use async_trait::async_trait;

use super::client::ChainClientError;
use super::types::{LedgerCall, TxReceipt};

sol! {
    #[sol(rpc)]
    contract BankBlockchain {
        function createAccount() external;
        function deposit() external payable;
        function withdraw(uint256 amount) external;
        function transfer(address to) external payable;
        function getBalance() external view returns (uint256);
        function accountExists(address account) external view returns (bool);
    }
}

/// Operations exposed by a deployed BankBlockchain contract.
#[async_trait]
pub trait BankLedger: Send + Sync {
    /// Address the contract is deployed at.
    fn address(&self) -> Address;

    async fn account_exists(&self, account: Address) -> Result<bool, ChainClientError>;

    /// `getBalance()` evaluated with `caller` as `msg.sender`, in wei.
    async fn get_balance(&self, caller: Address) -> Result<U256, ChainClientError>;

    async fn estimate_gas(&self, call: &LedgerCall, from: Address)
        -> Result<u64, ChainClientError>;

    /// Submit `call` and wait for its receipt.
    async fn send(
        &self,
        call: &LedgerCall,
        from: Address,
        gas: u64,
    ) -> Result<TxReceipt, ChainClientError>;
}

/// Contract handle backed by a JSON-RPC node.
pub struct RpcBankLedger {
    contract: BankBlockchain::BankBlockchainInstance<DynProvider>,
}

impl RpcBankLedger {
    pub fn new(address: Address, provider: DynProvider) -> Self {
        Self {
            contract: BankBlockchain::new(address, provider),
        }
    }
}

#[async_trait]
impl BankLedger for RpcBankLedger {
    fn address(&self) -> Address {
        *self.contract.address()
    }

    async fn account_exists(&self, account: Address) -> Result<bool, ChainClientError> {
        self.contract
            .accountExists(account)
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))
    }

    async fn get_balance(&self, caller: Address) -> Result<U256, ChainClientError> {
        self.contract
            .getBalance()
            .from(caller)
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))
    }

    async fn estimate_gas(
        &self,
        call: &LedgerCall,
        from: Address,
    ) -> Result<u64, ChainClientError> {
        let estimate = match call {
            LedgerCall::CreateAccount => {
                self.contract.createAccount().from(from).estimate_gas().await
            }
            LedgerCall::Deposit { value } => {
                self.contract.deposit().from(from).value(*value).estimate_gas().await
            }
            LedgerCall::Withdraw { amount } => {
                self.contract.withdraw(*amount).from(from).estimate_gas().await
            }
            LedgerCall::Transfer { to, value } => {
                self.contract
                    .transfer(*to)
                    .from(from)
                    .value(*value)
                    .estimate_gas()
                    .await
            }
        };

        estimate.map_err(|e| ChainClientError::ContractError(format!("Gas estimation failed: {}", e)))
    }

    async fn send(
        &self,
        call: &LedgerCall,
        from: Address,
        gas: u64,
    ) -> Result<TxReceipt, ChainClientError> {
        let pending = match call {
            LedgerCall::CreateAccount => {
                self.contract.createAccount().from(from).gas(gas).send().await
            }
            LedgerCall::Deposit { value } => {
                self.contract
                    .deposit()
                    .from(from)
                    .value(*value)
                    .gas(gas)
                    .send()
                    .await
            }
            LedgerCall::Withdraw { amount } => {
                self.contract.withdraw(*amount).from(from).gas(gas).send().await
            }
            LedgerCall::Transfer { to, value } => {
                self.contract
                    .transfer(*to)
                    .from(from)
                    .value(*value)
                    .gas(gas)
                    .send()
                    .await
            }
        }
        .map_err(|e| ChainClientError::TransactionFailed(format!("Failed to send: {}", e)))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ChainClientError::RpcError(format!("Failed to get receipt: {}", e)))?;

        let tx_hash = format!("{:?}", receipt.transaction_hash);
        if !receipt.status() {
            return Err(ChainClientError::TransactionFailed(format!(
                "transaction {} reverted",
                tx_hash
            )));
        }

        Ok(TxReceipt {
            tx_hash,
            block_number: receipt.block_number.unwrap_or(0),
            gas_used: receipt.gas_used as u64,
            success: true,
        })
    }
}
