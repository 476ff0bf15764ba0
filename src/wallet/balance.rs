// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Balance fetching and the sender/recipient balance snapshot.

use std::collections::BTreeMap;

use alloy::primitives::Address;
use tracing::{debug, warn};

use super::provider::WalletProvider;
use super::validator::{is_valid_address, parse_address};
use crate::blockchain::{from_wei, BankLedger};

/// Address → ether balance for the sender and (if set) the recipient.
pub type BalanceSnapshot = BTreeMap<String, String>;

/// A balance plus the diagnostic raised while fetching it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBalance {
    pub balance: String,
    pub diagnostic: Option<String>,
}

impl FetchedBalance {
    fn zero() -> Self {
        Self {
            balance: "0".to_string(),
            diagnostic: None,
        }
    }

    fn failed(address: &str, error: impl std::fmt::Display) -> Self {
        Self {
            balance: "0".to_string(),
            diagnostic: Some(format!("Error fetching balance for {address}: {error}")),
        }
    }
}

/// Reads balances through the session's contract handle.
///
/// Never fails: anything that goes wrong becomes a "0" balance, and call
/// failures additionally carry a diagnostic.
pub struct BalanceFetcher<'a> {
    wallet: Option<&'a dyn WalletProvider>,
    contract: Option<&'a dyn BankLedger>,
}

impl<'a> BalanceFetcher<'a> {
    pub fn new(wallet: Option<&'a dyn WalletProvider>, contract: Option<&'a dyn BankLedger>) -> Self {
        Self { wallet, contract }
    }

    fn resolve(&self, address: &str) -> Option<(&'a dyn BankLedger, Address)> {
        let contract = self.contract?;
        if !is_valid_address(self.wallet, address) {
            return None;
        }
        parse_address(address).map(|parsed| (contract, parsed))
    }

    /// Whether `address` has an account on the contract; false on any failure.
    pub async fn account_exists(&self, address: &str) -> bool {
        let Some((contract, parsed)) = self.resolve(address) else {
            return false;
        };

        match contract.account_exists(parsed).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!(address = %address, error = %e, "Failed to check account existence");
                false
            }
        }
    }

    /// Balance of `address` in ether.
    ///
    /// Accounts unknown to the contract report "0" without calling
    /// `getBalance()`, which would revert for them.
    pub async fn fetch(&self, address: &str) -> FetchedBalance {
        let Some((contract, parsed)) = self.resolve(address) else {
            return FetchedBalance::zero();
        };

        match contract.account_exists(parsed).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(address = %address, "Account does not exist");
                return FetchedBalance::zero();
            }
            Err(e) => {
                warn!(address = %address, error = %e, "Failed to check account existence");
                return FetchedBalance::failed(address, e);
            }
        }

        match contract.get_balance(parsed).await {
            Ok(wei) => FetchedBalance {
                balance: from_wei(wei),
                diagnostic: None,
            },
            Err(e) => {
                warn!(address = %address, error = %e, "Failed to fetch balance");
                FetchedBalance::failed(address, e)
            }
        }
    }
}

/// Result of a full balance recomputation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub snapshot: BalanceSnapshot,
    pub account_created: bool,
    pub diagnostics: Vec<String>,
}

/// Recompute the snapshot and account status from scratch.
///
/// The snapshot only ever holds the current sender and recipient, so a
/// previous recipient or account disappears as soon as it is no longer
/// tracked.
pub async fn synchronize(
    fetcher: &BalanceFetcher<'_>,
    active: Option<Address>,
    recipient: Option<&str>,
) -> SyncOutcome {
    let mut outcome = SyncOutcome::default();

    let sender_key = active.map(|address| address.to_string());
    if let Some(sender) = sender_key.as_deref() {
        let fetched = fetcher.fetch(sender).await;
        outcome.diagnostics.extend(fetched.diagnostic);
        outcome.snapshot.insert(sender.to_string(), fetched.balance);
    }

    if let Some(recipient) = recipient.filter(|r| !r.is_empty()) {
        let fetched = fetcher.fetch(recipient).await;
        outcome.diagnostics.extend(fetched.diagnostic);
        // same account in any casing shares one checksummed entry
        let key = parse_address(recipient)
            .map(|address| address.to_string())
            .unwrap_or_else(|| recipient.to_string());
        outcome.snapshot.insert(key, fetched.balance);
    }

    if let Some(sender) = sender_key.as_deref() {
        outcome.account_created = fetcher.account_exists(sender).await;
    }

    outcome
}
