// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the gateway API. All types derive
//! `ToSchema` for the OpenAPI document.
//!
//! ## Amounts
//!
//! Amounts are accepted the way the dashboard forms produce them: as the raw
//! text the user typed, or as a JSON number. Validation happens downstream,
//! so `"abc"` reaches the validator and is answered with the usual message
//! instead of a deserialization error.
//!
//! ## Model Categories
//!
//! - **Bank**: traditional tab (REST banking API)
//! - **Chain**: blockchain tab (wallet session + contract)

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::bank::Account;
use crate::blockchain::TxReceipt;
use crate::wallet::{parse_address, ControllerView};

// =============================================================================
// Shared Types
// =============================================================================

/// Ethereum-compatible wallet address wrapper.
///
/// Format: `0x` followed by 40 hexadecimal characters (20 bytes).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    pub fn parse(&self) -> Option<Address> {
        parse_address(self.0.trim())
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for WalletAddress {
    fn from(value: &str) -> Self {
        WalletAddress(value.to_string())
    }
}

/// Amount as typed, or as a JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum RawAmount {
    Text(String),
    Number(f64),
}

impl RawAmount {
    pub fn as_input(&self) -> String {
        match self {
            RawAmount::Text(text) => text.clone(),
            RawAmount::Number(number) => number.to_string(),
        }
    }
}

impl Default for RawAmount {
    fn default() -> Self {
        RawAmount::Text(String::new())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AmountRequest {
    #[serde(default)]
    #[schema(value_type = String, example = "0.5")]
    pub amount: RawAmount,
}

// =============================================================================
// Bank Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BankTransferRequest {
    #[serde(default)]
    pub from_account_id: String,
    #[serde(default)]
    pub to_account_id: String,
    #[serde(default)]
    #[schema(value_type = String, example = "25")]
    pub amount: RawAmount,
}

/// Outcome of a traditional-tab action.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BankResponse {
    /// Status message for the dashboard
    pub message: String,
    /// Account after the action (absent for transfers)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<Account>,
}

// =============================================================================
// Chain Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipientRequest {
    /// Recipient address; null or blank clears it
    pub recipient: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChainTransferRequest {
    #[serde(default)]
    #[schema(value_type = String, example = "0.5")]
    pub amount: RawAmount,
    /// Set the recipient before transferring
    #[serde(default)]
    pub to: Option<String>,
}

/// Simulated `accountsChanged` notification.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountsChangedRequest {
    pub accounts: Vec<WalletAddress>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Connected,
    NoAccounts,
    Failed,
    AlreadyConnecting,
    Unavailable,
    Rejected,
    Succeeded,
}

/// Result of a blockchain-tab action plus the state it left behind.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChainActionResponse {
    pub outcome: OutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<TxReceipt>,
    pub state: ControllerView,
}
