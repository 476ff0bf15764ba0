// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Traditional banking tab: a thin client over the REST banking API.

pub mod client;
pub mod types;

pub use client::{BankApiError, RestBankClient};
pub use types::{Account, BankAction};
