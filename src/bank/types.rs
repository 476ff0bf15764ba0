// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account as returned by the banking API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Account {
    /// Server-assigned account id
    #[schema(example = 1)]
    pub id: i64,
    /// Balance in the bank's currency
    #[serde(default)]
    #[schema(example = 125.5)]
    pub balance: f64,
}

/// Error payload the banking API returns on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ServerError {
    #[serde(default)]
    pub message: Option<String>,
}

/// A traditional-tab action, for user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankAction {
    CreateAccount,
    Deposit,
    Withdraw,
    Transfer,
    FetchBalance,
}

impl BankAction {
    pub fn success_message(self) -> &'static str {
        match self {
            BankAction::CreateAccount => "Account created",
            BankAction::Deposit => "Deposit successful",
            BankAction::Withdraw => "Withdrawal successful",
            BankAction::Transfer => "Transfer successful",
            BankAction::FetchBalance => "Fetched balance",
        }
    }

    pub fn failure_message(self, reason: impl std::fmt::Display) -> String {
        match self {
            BankAction::CreateAccount => format!("Failed to create account: {reason}"),
            BankAction::Deposit => format!("Deposit failed: {reason}"),
            BankAction::Withdraw => format!("Withdrawal failed: {reason}"),
            BankAction::Transfer => format!("Transfer failed: {reason}"),
            BankAction::FetchBalance => format!("Failed to fetch balance: {reason}"),
        }
    }

    /// Validation message for a missing or non-positive amount.
    pub(crate) fn invalid_amount_message(self) -> &'static str {
        match self {
            BankAction::Withdraw => "Please enter a valid amount to withdraw.",
            BankAction::Transfer => "Please enter a valid amount to transfer.",
            _ => "Please enter a valid amount to deposit.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_tolerates_missing_balance() {
        let account: Account = serde_json::from_str(r#"{"id":7}"#).unwrap();
        assert_eq!(account, Account { id: 7, balance: 0.0 });
    }

    #[test]
    fn failure_messages_follow_action_wording() {
        assert_eq!(
            BankAction::CreateAccount.failure_message("boom"),
            "Failed to create account: boom"
        );
        assert_eq!(
            BankAction::Withdraw.failure_message("Insufficient funds"),
            "Withdrawal failed: Insufficient funds"
        );
    }
}
