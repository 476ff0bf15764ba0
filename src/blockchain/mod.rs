// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration for the BankBlockchain contract.
//!
//! This module provides functionality for:
//! - Connecting to an EVM node over JSON-RPC
//! - Locating the contract through its deployment manifest
//! - Calling the contract (RPC-backed or in-process)
//! - Converting between wei and ether

pub mod client;
pub mod contract;
pub mod manifest;
pub mod memory;
pub mod types;
pub mod units;

pub use client::{connect_http, ChainClientError};
pub use contract::{BankLedger, RpcBankLedger};
pub use manifest::DeploymentManifest;
pub use memory::{MemoryLedger, MEMORY_CONTRACT_ADDRESS, MEMORY_NETWORK_ID};
pub use types::*;
pub use units::{from_wei, to_wei};
