// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types shared by the contract backends.

use alloy::primitives::{Address, U256};
use serde::Serialize;
use utoipa::ToSchema;

/// A state-changing call on the BankBlockchain contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCall {
    /// `createAccount()`
    CreateAccount,
    /// `deposit()` with `value` attached.
    Deposit { value: U256 },
    /// `withdraw(amount)`
    Withdraw { amount: U256 },
    /// `transfer(to)` with `value` attached.
    Transfer { to: Address, value: U256 },
}

impl LedgerCall {
    /// Short label used in timing messages and logs.
    pub fn label(&self) -> &'static str {
        match self {
            LedgerCall::CreateAccount => "create account",
            LedgerCall::Deposit { .. } => "deposit",
            LedgerCall::Withdraw { .. } => "withdraw",
            LedgerCall::Transfer { .. } => "transfer",
        }
    }
}

/// Transaction receipt after confirmation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TxReceipt {
    /// Transaction hash
    pub tx_hash: String,
    /// Block number where transaction was included
    pub block_number: u64,
    /// Gas actually used
    pub gas_used: u64,
    /// Whether the transaction was successful
    pub success: bool,
}
