// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process BankBlockchain ledger.
//!
//! Applies the contract's rules to an in-memory balance table so the gateway
//! can run without a node (`LEDGER_BACKEND=memory`). Reverts are reported the
//! way a node reports them (`execution reverted: <reason>`), both from gas
//! estimation and from submission.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use alloy::primitives::{address, Address, U256};
use async_trait::async_trait;

use super::client::ChainClientError;
use super::contract::BankLedger;
use super::types::{LedgerCall, TxReceipt};

/// Network id reported for the in-process chain (Ganache's default).
pub const MEMORY_NETWORK_ID: u64 = 5777;

/// Address the in-process contract is "deployed" at.
pub const MEMORY_CONTRACT_ADDRESS: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

const CREATE_ACCOUNT_GAS: u64 = 45_000;
const DEPOSIT_GAS: u64 = 30_000;
const WITHDRAW_GAS: u64 = 35_000;
const TRANSFER_GAS: u64 = 52_000;

#[derive(Debug, Default)]
struct LedgerState {
    accounts: HashMap<Address, U256>,
    block_number: u64,
}

/// Number of calls the ledger has served, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerCallStats {
    pub exists_calls: u64,
    pub balance_calls: u64,
    pub estimate_calls: u64,
    pub send_calls: u64,
}

#[derive(Debug, Default)]
struct Counters {
    exists: AtomicU64,
    balance: AtomicU64,
    estimate: AtomicU64,
    send: AtomicU64,
}

/// In-memory contract. Clones share the same balance table.
#[derive(Debug, Clone)]
pub struct MemoryLedger {
    address: Address,
    state: Arc<Mutex<LedgerState>>,
    counters: Arc<Counters>,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            address: MEMORY_CONTRACT_ADDRESS,
            state: Arc::new(Mutex::new(LedgerState::default())),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Handle to the same ledger reporting a different contract address.
    pub fn at(&self, address: Address) -> Self {
        Self {
            address,
            ..self.clone()
        }
    }

    pub fn stats(&self) -> LedgerCallStats {
        LedgerCallStats {
            exists_calls: self.counters.exists.load(Ordering::Relaxed),
            balance_calls: self.counters.balance.load(Ordering::Relaxed),
            estimate_calls: self.counters.estimate.load(Ordering::Relaxed),
            send_calls: self.counters.send.load(Ordering::Relaxed),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, LedgerState>, ChainClientError> {
        self.state
            .lock()
            .map_err(|e| ChainClientError::RpcError(format!("ledger lock poisoned: {e}")))
    }

    /// Validate `call` against the current state and return its gas cost.
    fn check(state: &LedgerState, call: &LedgerCall, from: Address) -> Result<u64, ChainClientError> {
        let sender = state.accounts.get(&from);
        match call {
            LedgerCall::CreateAccount => {
                if sender.is_some() {
                    return Err(revert("Account already exists"));
                }
                Ok(CREATE_ACCOUNT_GAS)
            }
            LedgerCall::Deposit { .. } => {
                sender.ok_or_else(|| revert("Account does not exist"))?;
                Ok(DEPOSIT_GAS)
            }
            LedgerCall::Withdraw { amount } => {
                let balance = sender.ok_or_else(|| revert("Account does not exist"))?;
                if balance < amount {
                    return Err(revert("Insufficient balance"));
                }
                Ok(WITHDRAW_GAS)
            }
            LedgerCall::Transfer { to, value } => {
                let balance = sender.ok_or_else(|| revert("Account does not exist"))?;
                if !state.accounts.contains_key(to) {
                    return Err(revert("Recipient account does not exist"));
                }
                if balance < value {
                    return Err(revert("Insufficient balance"));
                }
                Ok(TRANSFER_GAS)
            }
        }
    }

    fn apply(state: &mut LedgerState, call: &LedgerCall, from: Address) {
        match call {
            LedgerCall::CreateAccount => {
                state.accounts.insert(from, U256::ZERO);
            }
            LedgerCall::Deposit { value } => {
                if let Some(balance) = state.accounts.get_mut(&from) {
                    *balance += *value;
                }
            }
            LedgerCall::Withdraw { amount } => {
                if let Some(balance) = state.accounts.get_mut(&from) {
                    *balance -= *amount;
                }
            }
            LedgerCall::Transfer { to, value } => {
                if let Some(balance) = state.accounts.get_mut(&from) {
                    *balance -= *value;
                }
                if let Some(balance) = state.accounts.get_mut(to) {
                    *balance += *value;
                }
            }
        }
    }
}

fn revert(reason: &str) -> ChainClientError {
    ChainClientError::ContractError(format!("execution reverted: {reason}"))
}

#[async_trait]
impl BankLedger for MemoryLedger {
    fn address(&self) -> Address {
        self.address
    }

    async fn account_exists(&self, account: Address) -> Result<bool, ChainClientError> {
        self.counters.exists.fetch_add(1, Ordering::Relaxed);
        Ok(self.lock()?.accounts.contains_key(&account))
    }

    async fn get_balance(&self, caller: Address) -> Result<U256, ChainClientError> {
        self.counters.balance.fetch_add(1, Ordering::Relaxed);
        self.lock()?
            .accounts
            .get(&caller)
            .copied()
            .ok_or_else(|| revert("Account does not exist"))
    }

    async fn estimate_gas(
        &self,
        call: &LedgerCall,
        from: Address,
    ) -> Result<u64, ChainClientError> {
        self.counters.estimate.fetch_add(1, Ordering::Relaxed);
        let state = self.lock()?;
        Self::check(&state, call, from)
    }

    async fn send(
        &self,
        call: &LedgerCall,
        from: Address,
        gas: u64,
    ) -> Result<TxReceipt, ChainClientError> {
        let sequence = self.counters.send.fetch_add(1, Ordering::Relaxed) + 1;
        let mut state = self.lock()?;

        let required = Self::check(&state, call, from)?;
        if gas < required {
            return Err(ChainClientError::TransactionFailed(format!(
                "out of gas: {} provided, {} required",
                gas, required
            )));
        }

        Self::apply(&mut state, call, from);
        state.block_number += 1;

        Ok(TxReceipt {
            tx_hash: format!("0x{:064x}", sequence),
            block_number: state.block_number,
            gas_used: required,
            success: true,
        })
    }
}
