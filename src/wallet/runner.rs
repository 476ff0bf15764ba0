// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Mutating contract calls: input validation, gas estimation, submission
//! and timing.

use std::time::{Duration, Instant};

use alloy::primitives::Address;
use tracing::info;

use super::provider::WalletProvider;
use super::validator::{is_valid_address, parse_address, parse_positive_amount};
use crate::blockchain::{BankLedger, ChainClientError, LedgerCall, TxReceipt};

/// User-facing contract operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateAccount,
    Deposit,
    Withdraw,
    Transfer,
}

impl Operation {
    pub fn success_message(self) -> &'static str {
        match self {
            Operation::CreateAccount => "Account created successfully",
            Operation::Deposit => "Deposit successful",
            Operation::Withdraw => "Withdrawal successful",
            Operation::Transfer => "Transfer successful",
        }
    }

    pub fn failure_message(self, error: &ChainClientError) -> String {
        let verb = match self {
            Operation::CreateAccount => "create account",
            Operation::Deposit => "deposit",
            Operation::Withdraw => "withdraw",
            Operation::Transfer => "transfer",
        };
        format!("Failed to {verb}: {error}")
    }

    fn invalid_input_message(self) -> &'static str {
        match self {
            Operation::CreateAccount => "Invalid account request.",
            Operation::Deposit => "Invalid deposit amount.",
            Operation::Withdraw => "Invalid withdrawal amount.",
            Operation::Transfer => {
                "Please ensure all fields are filled correctly and the amount is positive."
            }
        }
    }

    /// Validate raw input and build the contract call.
    ///
    /// The error is the message to show; nothing has been sent at that point.
    pub fn prepare(
        self,
        wallet: Option<&dyn WalletProvider>,
        amount: Option<&str>,
        recipient: Option<&str>,
    ) -> Result<LedgerCall, &'static str> {
        let invalid = self.invalid_input_message();
        match self {
            Operation::CreateAccount => Ok(LedgerCall::CreateAccount),
            Operation::Deposit => {
                let value = amount.and_then(parse_positive_amount).ok_or(invalid)?;
                Ok(LedgerCall::Deposit { value })
            }
            Operation::Withdraw => {
                let amount = amount.and_then(parse_positive_amount).ok_or(invalid)?;
                Ok(LedgerCall::Withdraw { amount })
            }
            Operation::Transfer => {
                let recipient = recipient.filter(|r| !r.is_empty()).ok_or(invalid)?;
                let value = amount.and_then(parse_positive_amount).ok_or(invalid)?;
                if !is_valid_address(wallet, recipient) {
                    return Err(invalid);
                }
                let to = parse_address(recipient).ok_or(invalid)?;
                Ok(LedgerCall::Transfer { to, value })
            }
        }
    }
}

/// A confirmed transaction and how long it took.
#[derive(Debug, Clone)]
pub struct Completed {
    pub receipt: TxReceipt,
    pub elapsed: Duration,
}

impl Completed {
    pub fn timing_message(&self, label: &str) -> String {
        format!(
            "Last transaction ({}) took: {} ms",
            label,
            self.elapsed.as_millis()
        )
    }
}

/// Runs contract calls on behalf of one account.
pub struct TransactionRunner<'a> {
    contract: &'a dyn BankLedger,
    from: Address,
}

impl<'a> TransactionRunner<'a> {
    pub fn new(contract: &'a dyn BankLedger, from: Address) -> Self {
        Self { contract, from }
    }

    /// Estimate gas, submit with that limit, and wait for confirmation.
    ///
    /// The elapsed time covers submission through confirmation only.
    pub async fn run(&self, call: &LedgerCall) -> Result<Completed, ChainClientError> {
        let gas = self.contract.estimate_gas(call, self.from).await?;

        let started = Instant::now();
        let receipt = self.contract.send(call, self.from, gas).await?;
        let elapsed = started.elapsed();

        info!(
            operation = call.label(),
            from = %self.from,
            tx_hash = %receipt.tx_hash,
            gas_limit = gas,
            gas_used = receipt.gas_used,
            elapsed_ms = elapsed.as_millis() as u64,
            "Contract transaction confirmed"
        );

        Ok(Completed { receipt, elapsed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{to_wei, MemoryLedger};
    use crate::wallet::provider::{StaticWalletProvider, DEFAULT_DEV_ACCOUNTS};

    #[test]
    fn prepare_rejects_bad_amounts() {
        for raw in ["", "0", "-2", "abc"] {
            assert_eq!(
                Operation::Deposit.prepare(None, Some(raw), None),
                Err("Invalid deposit amount.")
            );
            assert_eq!(
                Operation::Withdraw.prepare(None, Some(raw), None),
                Err("Invalid withdrawal amount.")
            );
        }
        assert!(Operation::Deposit.prepare(None, None, None).is_err());
    }

    #[test]
    fn prepare_transfer_requires_valid_recipient() {
        let wallet = StaticWalletProvider::with_dev_accounts(MemoryLedger::new());
        let recipient = DEFAULT_DEV_ACCOUNTS[1].to_string();

        let call = Operation::Transfer
            .prepare(Some(&wallet), Some("0.5"), Some(&recipient))
            .unwrap();
        assert_eq!(
            call,
            LedgerCall::Transfer {
                to: DEFAULT_DEV_ACCOUNTS[1],
                value: to_wei("0.5").unwrap()
            }
        );

        assert!(Operation::Transfer
            .prepare(Some(&wallet), Some("0.5"), Some("0x1234"))
            .is_err());
        assert!(Operation::Transfer
            .prepare(Some(&wallet), Some("0.5"), None)
            .is_err());
        // without a wallet client no address is valid
        assert!(Operation::Transfer
            .prepare(None, Some("0.5"), Some(&recipient))
            .is_err());
    }

    #[tokio::test]
    async fn run_estimates_then_sends() {
        let ledger = MemoryLedger::new();
        let runner = TransactionRunner::new(&ledger, DEFAULT_DEV_ACCOUNTS[0]);

        let completed = runner.run(&LedgerCall::CreateAccount).await.unwrap();
        assert!(completed.receipt.success);
        assert!(completed
            .timing_message("create account")
            .starts_with("Last transaction (create account) took: "));

        let stats = ledger.stats();
        assert_eq!(stats.estimate_calls, 1);
        assert_eq!(stats.send_calls, 1);
    }

    #[tokio::test]
    async fn failed_estimate_skips_submission() {
        let ledger = MemoryLedger::new();
        let runner = TransactionRunner::new(&ledger, DEFAULT_DEV_ACCOUNTS[0]);

        let err = runner
            .run(&LedgerCall::Withdraw {
                amount: to_wei("1").unwrap(),
            })
            .await
            .unwrap_err();

        assert!(err.to_string().contains("revert"));
        assert_eq!(ledger.stats().send_calls, 0);
        assert_eq!(
            Operation::Withdraw.failure_message(&err),
            format!("Failed to withdraw: {err}")
        );
    }
}
