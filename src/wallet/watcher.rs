// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Account Watcher
//!
//! A JSON-RPC node does not push `accountsChanged` the way a browser wallet
//! does. The watcher polls `eth_accounts` and announces the list through the
//! provider whenever it differs from the previous poll.
//!
//! The first successful poll only records a baseline; the controller picks up
//! the initial account itself during initialization.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken`, like the account listener.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::provider::WalletProvider;

/// Default interval between `eth_accounts` polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

pub struct AccountWatcher {
    wallet: Arc<dyn WalletProvider>,
    poll_interval: Duration,
    last_seen: Option<Vec<Address>>,
}

impl AccountWatcher {
    pub fn new(wallet: Arc<dyn WalletProvider>) -> Self {
        Self {
            wallet,
            poll_interval: DEFAULT_POLL_INTERVAL,
            last_seen: None,
        }
    }

    pub fn with_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run the poll loop until the cancellation token is triggered.
    ///
    /// ```rust,ignore
    /// tokio::spawn(watcher.run(shutdown.clone()));
    /// ```
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            interval_ms = self.poll_interval.as_millis() as u64,
            "Account watcher starting"
        );

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            self.poll_step().await;

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {},
                _ = shutdown.cancelled() => break,
            }
        }

        info!("Account watcher shutting down");
    }

    /// Poll once; returns whether a change was announced.
    async fn poll_step(&mut self) -> bool {
        let accounts = match self.wallet.accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!(error = %e, "Account watcher: failed to poll accounts");
                return false;
            }
        };

        match self.last_seen.replace(accounts.clone()) {
            None => {
                debug!(count = accounts.len(), "Account watcher: baseline recorded");
                false
            }
            Some(previous) if previous == accounts => false,
            Some(_) => {
                info!(count = accounts.len(), "Account watcher: accounts changed");
                self.wallet.announce_accounts(accounts);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::blockchain::{BankLedger, ChainClientError, MemoryLedger};
    use crate::wallet::provider::{AccountsChangedHub, AccountsSubscription, DEFAULT_DEV_ACCOUNTS};

    /// Node-like wallet: accounts change underneath without notification.
    struct PolledWallet {
        accounts: Mutex<Vec<Address>>,
        hub: AccountsChangedHub,
    }

    impl PolledWallet {
        fn set(&self, accounts: Vec<Address>) {
            *self.accounts.lock().unwrap() = accounts;
        }
    }

    #[async_trait]
    impl WalletProvider for PolledWallet {
        async fn request_accounts(&self) -> Result<Vec<Address>, ChainClientError> {
            self.accounts().await
        }

        async fn accounts(&self) -> Result<Vec<Address>, ChainClientError> {
            Ok(self.accounts.lock().unwrap().clone())
        }

        async fn network_id(&self) -> Result<u64, ChainClientError> {
            Ok(1)
        }

        fn contract_at(&self, address: Address) -> Arc<dyn BankLedger> {
            Arc::new(MemoryLedger::new().at(address))
        }

        fn subscribe(&self) -> AccountsSubscription {
            self.hub.subscribe()
        }

        fn announce_accounts(&self, accounts: Vec<Address>) {
            self.hub.emit(accounts);
        }
    }

    fn polled(accounts: Vec<Address>) -> Arc<PolledWallet> {
        Arc::new(PolledWallet {
            accounts: Mutex::new(accounts),
            hub: AccountsChangedHub::new(),
        })
    }

    #[tokio::test]
    async fn announces_only_changes_after_baseline() {
        let wallet = polled(vec![DEFAULT_DEV_ACCOUNTS[0]]);
        let mut subscription = wallet.subscribe();
        let mut watcher = AccountWatcher::new(wallet.clone());

        assert!(!watcher.poll_step().await);
        assert!(!watcher.poll_step().await);

        wallet.set(vec![DEFAULT_DEV_ACCOUNTS[1], DEFAULT_DEV_ACCOUNTS[0]]);
        assert!(watcher.poll_step().await);
        assert_eq!(
            subscription.next().await,
            Some(vec![DEFAULT_DEV_ACCOUNTS[1], DEFAULT_DEV_ACCOUNTS[0]])
        );

        wallet.set(Vec::new());
        assert!(watcher.poll_step().await);
        assert_eq!(subscription.next().await, Some(Vec::new()));
    }

    #[tokio::test]
    async fn stops_on_cancellation() {
        let wallet = polled(vec![DEFAULT_DEV_ACCOUNTS[0]]);
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(
            AccountWatcher::new(wallet)
                .with_interval(Duration::from_millis(10))
                .run(shutdown.clone()),
        );

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("watcher stopped")
            .unwrap();
    }
}
