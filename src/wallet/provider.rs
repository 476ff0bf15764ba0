// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet provider port.
//!
//! A [`WalletProvider`] is the Rust face of an EIP-1193 wallet: it hands out
//! authorized accounts, reports the network, builds contract handles, and
//! fires `accountsChanged` notifications through an [`AccountsChangedHub`].

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex,
};

use alloy::{
    primitives::{address, Address},
    providers::{DynProvider, Provider},
};
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::blockchain::{
    connect_http, BankLedger, ChainClientError, MemoryLedger, RpcBankLedger, MEMORY_NETWORK_ID,
};

/// JSON-RPC "method not found".
const METHOD_NOT_FOUND: i64 = -32601;

/// Pending notifications kept per subscriber before older ones are dropped.
const NOTIFICATION_BUFFER: usize = 16;

/// Accounts exposed by the in-process wallet (first two well-known dev keys).
pub const DEFAULT_DEV_ACCOUNTS: [Address; 2] = [
    address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
    address!("70997970C51812dc3A010C7d01b50e0d17dc79C8"),
];

#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// `eth_requestAccounts`: ask the wallet to authorize and list accounts.
    async fn request_accounts(&self) -> Result<Vec<Address>, ChainClientError>;

    /// `eth_accounts`: accounts already authorized, without prompting.
    async fn accounts(&self) -> Result<Vec<Address>, ChainClientError>;

    /// `net_version`
    async fn network_id(&self) -> Result<u64, ChainClientError>;

    /// Contract handle bound to this provider.
    fn contract_at(&self, address: Address) -> Arc<dyn BankLedger>;

    /// Register for `accountsChanged`. Dropping the subscription unregisters.
    fn subscribe(&self) -> AccountsSubscription;

    /// Fire `accountsChanged` to every subscriber.
    fn announce_accounts(&self, accounts: Vec<Address>);
}

/// Fan-out point for `accountsChanged` notifications.
#[derive(Debug, Clone)]
pub struct AccountsChangedHub {
    sender: broadcast::Sender<Vec<Address>>,
}

impl Default for AccountsChangedHub {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountsChangedHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(NOTIFICATION_BUFFER);
        Self { sender }
    }

    pub fn subscribe(&self) -> AccountsSubscription {
        AccountsSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Deliver `accounts` to current subscribers; returns how many received it.
    pub fn emit(&self, accounts: Vec<Address>) -> usize {
        self.sender.send(accounts).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Registration for `accountsChanged`, released on drop.
#[derive(Debug)]
pub struct AccountsSubscription {
    receiver: broadcast::Receiver<Vec<Address>>,
}

impl AccountsSubscription {
    /// Wait for the next notification. `None` once the provider is gone.
    pub async fn next(&mut self) -> Option<Vec<Address>> {
        loop {
            match self.receiver.recv().await {
                Ok(accounts) => return Some(accounts),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "accountsChanged subscriber lagged, skipping to latest");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Wallet backed by a JSON-RPC node with unlocked accounts.
pub struct RpcWalletProvider {
    provider: DynProvider,
    hub: AccountsChangedHub,
}

impl RpcWalletProvider {
    pub fn connect(rpc_url: &str) -> Result<Self, ChainClientError> {
        Ok(Self {
            provider: connect_http(rpc_url)?,
            hub: AccountsChangedHub::new(),
        })
    }
}

#[async_trait]
impl WalletProvider for RpcWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ChainClientError> {
        let requested = self
            .provider
            .raw_request::<_, Vec<Address>>(
                "eth_requestAccounts".into(),
                Vec::<serde_json::Value>::new(),
            )
            .await;

        match requested {
            Ok(accounts) => Ok(accounts),
            // Plain nodes have no authorization prompt; their accounts are already unlocked.
            Err(e) if e.as_error_resp().map(|r| r.code) == Some(METHOD_NOT_FOUND) => {
                debug!("eth_requestAccounts unsupported, falling back to eth_accounts");
                self.accounts().await
            }
            Err(e) => Err(ChainClientError::RpcError(e.to_string())),
        }
    }

    async fn accounts(&self) -> Result<Vec<Address>, ChainClientError> {
        self.provider
            .get_accounts()
            .await
            .map_err(|e| ChainClientError::RpcError(e.to_string()))
    }

    async fn network_id(&self) -> Result<u64, ChainClientError> {
        self.provider
            .get_net_version()
            .await
            .map_err(|e| ChainClientError::RpcError(e.to_string()))
    }

    fn contract_at(&self, address: Address) -> Arc<dyn BankLedger> {
        Arc::new(RpcBankLedger::new(address, self.provider.clone()))
    }

    fn subscribe(&self) -> AccountsSubscription {
        self.hub.subscribe()
    }

    fn announce_accounts(&self, accounts: Vec<Address>) {
        self.hub.emit(accounts);
    }
}

/// Deterministic in-process wallet paired with a [`MemoryLedger`].
///
/// `eth_accounts` stays empty until `eth_requestAccounts` has been answered,
/// the same way a browser wallet behaves before the user authorizes the page.
pub struct StaticWalletProvider {
    accounts: Mutex<Vec<Address>>,
    authorized: AtomicBool,
    network_id: u64,
    ledger: MemoryLedger,
    hub: AccountsChangedHub,
    requests: AtomicU64,
}

impl StaticWalletProvider {
    pub fn new(accounts: Vec<Address>, ledger: MemoryLedger) -> Self {
        Self {
            accounts: Mutex::new(accounts),
            authorized: AtomicBool::new(false),
            network_id: MEMORY_NETWORK_ID,
            ledger,
            hub: AccountsChangedHub::new(),
            requests: AtomicU64::new(0),
        }
    }

    pub fn with_dev_accounts(ledger: MemoryLedger) -> Self {
        Self::new(DEFAULT_DEV_ACCOUNTS.to_vec(), ledger)
    }

    /// Report a different network id (e.g. to simulate a missing deployment).
    pub fn on_network(mut self, network_id: u64) -> Self {
        self.network_id = network_id;
        self
    }

    /// Start out with the accounts already authorized.
    pub fn authorized(self) -> Self {
        self.authorized.store(true, Ordering::SeqCst);
        self
    }

    /// Number of `eth_requestAccounts` calls answered so far.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn hub(&self) -> &AccountsChangedHub {
        &self.hub
    }

    fn snapshot(&self) -> Result<Vec<Address>, ChainClientError> {
        self.accounts
            .lock()
            .map(|accounts| accounts.clone())
            .map_err(|e| ChainClientError::RpcError(format!("wallet lock poisoned: {e}")))
    }
}

#[async_trait]
impl WalletProvider for StaticWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ChainClientError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.authorized.store(true, Ordering::SeqCst);
        self.snapshot()
    }

    async fn accounts(&self) -> Result<Vec<Address>, ChainClientError> {
        if self.authorized.load(Ordering::SeqCst) {
            self.snapshot()
        } else {
            Ok(Vec::new())
        }
    }

    async fn network_id(&self) -> Result<u64, ChainClientError> {
        Ok(self.network_id)
    }

    fn contract_at(&self, address: Address) -> Arc<dyn BankLedger> {
        Arc::new(self.ledger.at(address))
    }

    fn subscribe(&self) -> AccountsSubscription {
        self.hub.subscribe()
    }

    fn announce_accounts(&self, accounts: Vec<Address>) {
        match self.accounts.lock() {
            Ok(mut current) => *current = accounts.clone(),
            Err(e) => warn!(error = %e, "wallet lock poisoned, announcing without storing"),
        }
        self.hub.emit(accounts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_wallet_requires_authorization() {
        let wallet = StaticWalletProvider::with_dev_accounts(MemoryLedger::new());
        assert!(wallet.accounts().await.unwrap().is_empty());

        let requested = wallet.request_accounts().await.unwrap();
        assert_eq!(requested, DEFAULT_DEV_ACCOUNTS.to_vec());
        assert_eq!(wallet.accounts().await.unwrap(), DEFAULT_DEV_ACCOUNTS.to_vec());
        assert_eq!(wallet.request_count(), 1);
    }

    #[tokio::test]
    async fn subscription_receives_announcements_and_releases_on_drop() {
        let wallet = StaticWalletProvider::with_dev_accounts(MemoryLedger::new()).authorized();
        let mut subscription = wallet.subscribe();
        assert_eq!(wallet.hub().subscriber_count(), 1);

        wallet.announce_accounts(vec![DEFAULT_DEV_ACCOUNTS[1]]);
        assert_eq!(subscription.next().await, Some(vec![DEFAULT_DEV_ACCOUNTS[1]]));
        assert_eq!(wallet.accounts().await.unwrap(), vec![DEFAULT_DEV_ACCOUNTS[1]]);

        drop(subscription);
        assert_eq!(wallet.hub().subscriber_count(), 0);
    }

    #[tokio::test]
    async fn lagged_subscriber_skips_to_latest() {
        let hub = AccountsChangedHub::new();
        let mut subscription = hub.subscribe();
        for i in 0..(NOTIFICATION_BUFFER + 4) {
            let mut bytes = [0u8; 20];
            bytes[19] = i as u8;
            hub.emit(vec![Address::from(bytes)]);
        }

        let received = subscription.next().await.unwrap();
        assert_ne!(received[0], Address::ZERO);
    }

    #[tokio::test]
    async fn contract_handles_share_the_ledger() {
        let ledger = MemoryLedger::new();
        let wallet = StaticWalletProvider::with_dev_accounts(ledger.clone()).on_network(1337);
        assert_eq!(wallet.network_id().await.unwrap(), 1337);

        let handle = wallet.contract_at(Address::ZERO);
        assert_eq!(handle.address(), Address::ZERO);
        assert!(!handle.account_exists(DEFAULT_DEV_ACCOUNTS[0]).await.unwrap());
        assert_eq!(ledger.stats().exists_calls, 1);
    }
}
