// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Sync Controller
//!
//! Owns the wallet session (active account + contract handle) and the
//! balances derived from it, and keeps both consistent as accounts change and
//! transactions complete.
//!
//! ## Lifecycle
//!
//! 1. [`WalletSyncController::initialize`] resolves the contract for the
//!    wallet's network from the deployment manifest, then activates an
//!    already-authorized account or falls through to
//!    [`WalletSyncController::connect`].
//! 2. [`WalletSyncController::spawn_account_listener`] registers for
//!    `accountsChanged` and follows the wallet until shutdown.
//! 3. Each contract operation validates input, estimates gas, submits,
//!    records its duration and resyncs balances.
//!
//! ## State
//!
//! Everything the controller publishes lives in one [`ControllerState`]
//! behind a `RwLock`. Writers hold the lock only between awaits, so readers
//! never observe half of an update. A resync is computed from a copy of the
//! session and applied in a single write; if the account or recipient
//! changed while it was in flight the result is dropped, because the change
//! itself triggers a newer resync. Overlapping operations otherwise resync
//! in whatever order they finish.

use std::sync::Arc;

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::{sync::RwLock, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use utoipa::ToSchema;

use super::balance::{synchronize, BalanceFetcher, BalanceSnapshot};
use super::provider::WalletProvider;
use super::runner::{Operation, TransactionRunner};
use super::session::{ConnectGate, ConnectionState, Session};
use super::validator::is_valid_address;
use crate::blockchain::{BankLedger, ChainClientError, DeploymentManifest, TxReceipt};

pub const NO_WALLET_MESSAGE: &str =
    "No wallet provider is available. Configure a wallet RPC endpoint to connect.";
pub const NO_ACTIVE_ACCOUNT_MESSAGE: &str = "Please connect to your wallet.";
pub const NO_ACCOUNTS_MESSAGE: &str = "No accounts found.";
pub const NOT_READY_MESSAGE: &str = "Connect a wallet account and load the contract first.";

/// Result of a connect attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected(Address),
    NoAccounts,
    Failed,
    /// Another connect attempt was already in flight.
    AlreadyConnecting,
    Unavailable,
}

/// Result of a contract operation.
#[derive(Debug, Clone)]
pub enum OperationOutcome {
    /// Input or session was not usable; nothing was sent.
    Rejected,
    Failed,
    Succeeded(TxReceipt),
}

#[derive(Debug, Clone)]
struct ControllerState {
    connection: ConnectionState,
    session: Session,
    recipient: Option<String>,
    snapshot: BalanceSnapshot,
    account_created: bool,
    message: Option<String>,
    transaction_time: Option<String>,
    sync_generation: u64,
    synced_at: Option<DateTime<Utc>>,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            connection: ConnectionState::Disconnected,
            session: Session::default(),
            recipient: None,
            snapshot: BalanceSnapshot::new(),
            account_created: false,
            message: None,
            transaction_time: None,
            sync_generation: 0,
            synced_at: None,
        }
    }
}

/// Published state of the blockchain tab.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ControllerView {
    /// Whether a wallet provider is configured at all
    pub wallet_available: bool,
    pub connection: ConnectionState,
    /// Active wallet account (checksummed)
    pub active_address: Option<String>,
    /// Recipient address as entered
    pub recipient: Option<String>,
    /// Resolved contract address, if the current network has a deployment
    pub contract_address: Option<String>,
    /// Ether balances of the active account and the recipient
    #[schema(value_type = Object)]
    pub balances: BalanceSnapshot,
    /// Whether the active account has been created on the contract
    pub account_created: bool,
    /// Last status or error message
    pub message: Option<String>,
    /// Duration of the last confirmed transaction
    pub transaction_time: Option<String>,
    /// Number of balance resyncs applied so far
    pub sync_generation: u64,
    pub synced_at: Option<DateTime<Utc>>,
}

pub struct WalletSyncController {
    wallet: Option<Arc<dyn WalletProvider>>,
    manifest: DeploymentManifest,
    gate: ConnectGate,
    state: RwLock<ControllerState>,
}

impl WalletSyncController {
    pub fn new(wallet: Option<Arc<dyn WalletProvider>>, manifest: DeploymentManifest) -> Self {
        Self {
            wallet,
            manifest,
            gate: ConnectGate::default(),
            state: RwLock::new(ControllerState::default()),
        }
    }

    pub async fn view(&self) -> ControllerView {
        let state = self.state.read().await;
        ControllerView {
            wallet_available: self.wallet.is_some(),
            connection: state.connection,
            active_address: state.session.active_address.map(|a| a.to_string()),
            recipient: state.recipient.clone(),
            contract_address: state.session.contract_address().map(|a| a.to_string()),
            balances: state.snapshot.clone(),
            account_created: state.account_created,
            message: state.message.clone(),
            transaction_time: state.transaction_time.clone(),
            sync_generation: state.sync_generation,
            synced_at: state.synced_at,
        }
    }

    pub fn wallet(&self) -> Option<&Arc<dyn WalletProvider>> {
        self.wallet.as_ref()
    }

    pub fn is_connecting(&self) -> bool {
        self.gate.is_busy()
    }

    pub fn is_valid_address(&self, candidate: &str) -> bool {
        is_valid_address(self.wallet.as_deref(), candidate)
    }

    /// Ether balance of `address`; "0" when unknown or on failure.
    pub async fn fetch_balance(&self, address: &str) -> String {
        let session = self.state.read().await.session.clone();
        let fetched = BalanceFetcher::new(self.wallet.as_deref(), session.contract.as_deref())
            .fetch(address)
            .await;
        if let Some(diagnostic) = fetched.diagnostic {
            self.set_message(diagnostic).await;
        }
        fetched.balance
    }

    async fn set_message(&self, message: impl Into<String>) {
        self.state.write().await.message = Some(message.into());
    }

    // -------------------------------------------------------------------------
    // Session management
    // -------------------------------------------------------------------------

    /// Resolve the contract and pick up the wallet's current account.
    ///
    /// A network without a recorded deployment is fatal for the session: the
    /// contract stays unset and no account is requested.
    pub async fn initialize(&self) {
        let Some(wallet) = self.wallet.clone() else {
            warn!("No wallet provider configured");
            self.set_message(NO_WALLET_MESSAGE).await;
            return;
        };

        let contract = match self.resolve_contract(wallet.as_ref()).await {
            Ok(contract) => contract,
            Err(e) => {
                error!(error = %e, "Contract setup failed");
                let mut state = self.state.write().await;
                state.session = state.session.with_contract(None);
                state.message = Some(e.to_string());
                return;
            }
        };

        info!(contract = %contract.address(), "Contract handle resolved");
        {
            let mut state = self.state.write().await;
            state.session = state.session.with_contract(Some(contract));
        }

        match wallet.accounts().await {
            Ok(accounts) => match accounts.first() {
                Some(&first) => self.activate(first).await,
                None => {
                    self.connect().await;
                }
            },
            Err(e) => {
                warn!(error = %e, "Failed to read wallet accounts");
                self.set_message(format!("Failed to read wallet accounts: {e}"))
                    .await;
            }
        }
    }

    async fn resolve_contract(
        &self,
        wallet: &dyn WalletProvider,
    ) -> Result<Arc<dyn BankLedger>, ChainClientError> {
        let network_id = wallet.network_id().await?;
        let address = self.manifest.deployment_for(network_id)?;
        debug!(network_id, contract = %address, "Found deployment");
        Ok(wallet.contract_at(address))
    }

    /// Ask the wallet for accounts and activate the first one.
    ///
    /// Concurrent calls collapse: only the first one reaches the wallet.
    /// Nothing is retried on failure.
    pub async fn connect(&self) -> ConnectOutcome {
        let Some(wallet) = self.wallet.clone() else {
            self.set_message(NO_WALLET_MESSAGE).await;
            return ConnectOutcome::Unavailable;
        };

        let Some(_permit) = self.gate.try_acquire() else {
            debug!("Connect already in flight, ignoring request");
            return ConnectOutcome::AlreadyConnecting;
        };

        let previous = {
            let mut state = self.state.write().await;
            std::mem::replace(&mut state.connection, ConnectionState::Connecting)
        };

        match wallet.request_accounts().await {
            Ok(accounts) => match accounts.first() {
                Some(&first) => {
                    info!(count = accounts.len(), "Wallet accounts found");
                    self.activate(first).await;
                    ConnectOutcome::Connected(first)
                }
                None => {
                    info!("Wallet returned no accounts");
                    let mut state = self.state.write().await;
                    state.connection = fallback_state(previous);
                    state.message = Some(NO_ACCOUNTS_MESSAGE.to_string());
                    ConnectOutcome::NoAccounts
                }
            },
            Err(e) => {
                warn!(error = %e, "Failed to connect wallet");
                let mut state = self.state.write().await;
                state.connection = fallback_state(previous);
                state.message = Some(format!("Failed to connect wallet: {e}"));
                ConnectOutcome::Failed
            }
        }
    }

    /// React to the wallet's `accountsChanged` notification.
    pub async fn handle_accounts_changed(&self, accounts: Vec<Address>) {
        match accounts.first() {
            Some(&first) => {
                info!(address = %first, "Wallet account changed");
                self.activate(first).await;
            }
            None => {
                info!("Wallet reports no accounts");
                let mut state = self.state.write().await;
                state.session = state.session.with_active(None);
                state.connection = ConnectionState::Disconnected;
                state.snapshot = BalanceSnapshot::new();
                state.account_created = false;
                state.message = Some(NO_ACTIVE_ACCOUNT_MESSAGE.to_string());
            }
        }
    }

    async fn activate(&self, address: Address) {
        {
            let mut state = self.state.write().await;
            state.session = state.session.with_active(Some(address));
            state.connection = ConnectionState::Connected;
        }
        self.resync().await;
    }

    /// Register for `accountsChanged` now and follow it until `shutdown`.
    ///
    /// The subscription is dropped, and so released, when the task ends.
    pub fn spawn_account_listener(
        self: &Arc<Self>,
        shutdown: CancellationToken,
    ) -> Option<JoinHandle<()>> {
        let mut subscription = self.wallet.as_ref()?.subscribe();
        let controller = Arc::clone(self);

        Some(tokio::spawn(async move {
            info!("accountsChanged listener starting");
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    next = subscription.next() => match next {
                        Some(accounts) => controller.handle_accounts_changed(accounts).await,
                        None => break,
                    },
                }
            }
            info!("accountsChanged listener stopped");
        }))
    }

    // -------------------------------------------------------------------------
    // Balance synchronization
    // -------------------------------------------------------------------------

    /// Set or clear the transfer recipient, then resync if an account is active.
    pub async fn set_recipient(&self, recipient: Option<String>) {
        let recipient = recipient
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        let has_active = {
            let mut state = self.state.write().await;
            state.recipient = recipient;
            state.session.active_address.is_some()
        };

        if has_active {
            self.resync().await;
        }
    }

    /// Rebuild the balance snapshot and account status from the contract.
    pub async fn resync(&self) {
        let (session, recipient) = {
            let state = self.state.read().await;
            (state.session.clone(), state.recipient.clone())
        };

        let fetcher = BalanceFetcher::new(self.wallet.as_deref(), session.contract.as_deref());
        let outcome = synchronize(&fetcher, session.active_address, recipient.as_deref()).await;

        let mut state = self.state.write().await;
        if state.session.active_address != session.active_address
            || state.session.contract_address() != session.contract_address()
            || state.recipient != recipient
        {
            debug!("Session changed during resync, discarding result");
            return;
        }

        state.snapshot = outcome.snapshot;
        state.account_created = outcome.account_created;
        if let Some(diagnostic) = outcome.diagnostics.last() {
            state.message = Some(diagnostic.clone());
        }
        state.sync_generation += 1;
        state.synced_at = Some(Utc::now());
        debug!(
            generation = state.sync_generation,
            tracked = state.snapshot.len(),
            "Balances resynced"
        );
    }

    // -------------------------------------------------------------------------
    // Contract operations
    // -------------------------------------------------------------------------

    pub async fn create_account(&self) -> OperationOutcome {
        self.run(Operation::CreateAccount, None).await
    }

    pub async fn deposit(&self, amount: &str) -> OperationOutcome {
        self.run(Operation::Deposit, Some(amount)).await
    }

    pub async fn withdraw(&self, amount: &str) -> OperationOutcome {
        self.run(Operation::Withdraw, Some(amount)).await
    }

    /// Transfer `amount` to the current recipient.
    pub async fn transfer(&self, amount: &str) -> OperationOutcome {
        self.run(Operation::Transfer, Some(amount)).await
    }

    async fn run(&self, operation: Operation, amount: Option<&str>) -> OperationOutcome {
        let (session, recipient) = {
            let state = self.state.read().await;
            (state.session.clone(), state.recipient.clone())
        };

        let call = match operation.prepare(self.wallet.as_deref(), amount, recipient.as_deref()) {
            Ok(call) => call,
            Err(message) => {
                debug!(?operation, message, "Rejected invalid input");
                self.set_message(message).await;
                return OperationOutcome::Rejected;
            }
        };

        let (Some(contract), Some(from)) = (session.contract.clone(), session.active_address)
        else {
            self.set_message(NOT_READY_MESSAGE).await;
            return OperationOutcome::Rejected;
        };

        match TransactionRunner::new(contract.as_ref(), from).run(&call).await {
            Ok(completed) => {
                {
                    let mut state = self.state.write().await;
                    state.transaction_time = Some(completed.timing_message(call.label()));
                    state.message = Some(operation.success_message().to_string());
                }
                self.resync().await;
                OperationOutcome::Succeeded(completed.receipt)
            }
            Err(e) => {
                warn!(?operation, from = %from, error = %e, "Contract operation failed");
                self.set_message(operation.failure_message(&e)).await;
                OperationOutcome::Failed
            }
        }
    }
}

fn fallback_state(previous: ConnectionState) -> ConnectionState {
    match previous {
        ConnectionState::Connected => ConnectionState::Connected,
        _ => ConnectionState::Disconnected,
    }
}
