// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bank Dashboard Gateway
//!
//! Backend for a two-tab banking dashboard: a traditional tab that proxies a
//! REST banking API, and a blockchain tab that keeps a wallet session in sync
//! with a BankBlockchain smart contract.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `bank` - REST banking API client
//! - `blockchain` - Contract bindings, deployment manifest, in-process ledger
//! - `wallet` - Wallet session, balance synchronization, transactions

pub mod api;
pub mod bank;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod wallet;
