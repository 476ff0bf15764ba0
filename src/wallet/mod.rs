// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet session, balance synchronization and contract transactions for the
//! blockchain tab.

pub mod balance;
pub mod controller;
pub mod provider;
pub mod runner;
pub mod session;
pub mod validator;
pub mod watcher;

pub use balance::{synchronize, BalanceFetcher, BalanceSnapshot, FetchedBalance, SyncOutcome};
pub use controller::{
    ConnectOutcome, ControllerView, OperationOutcome, WalletSyncController, NO_WALLET_MESSAGE,
};
pub use provider::{
    AccountsChangedHub, AccountsSubscription, RpcWalletProvider, StaticWalletProvider,
    WalletProvider, DEFAULT_DEV_ACCOUNTS,
};
pub use runner::{Completed, Operation, TransactionRunner};
pub use session::{ConnectGate, ConnectPermit, ConnectionState, Session};
pub use validator::{is_valid_address, parse_address, parse_positive_amount};
pub use watcher::AccountWatcher;
