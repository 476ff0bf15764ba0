// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Address and amount validation for wallet-tab input.

use std::str::FromStr;

use alloy::primitives::{Address, U256};

use super::provider::WalletProvider;
use crate::blockchain::to_wei;

/// Whether `candidate` is a usable address.
///
/// Always false without a wallet client. Otherwise an address is 40 hex
/// digits with an optional `0x` prefix; single-case input is accepted as is,
/// mixed case must carry a valid EIP-55 checksum.
pub fn is_valid_address(wallet: Option<&dyn WalletProvider>, candidate: &str) -> bool {
    wallet.is_some() && matches_address_format(candidate)
}

fn matches_address_format(candidate: &str) -> bool {
    let hex = candidate
        .strip_prefix("0x")
        .or_else(|| candidate.strip_prefix("0X"))
        .unwrap_or(candidate);

    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }

    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
    if !(has_lower && has_upper) {
        return true;
    }

    Address::parse_checksummed(format!("0x{hex}"), None).is_ok()
}

/// Parse an address that already passed [`is_valid_address`].
pub fn parse_address(candidate: &str) -> Option<Address> {
    let hex = candidate
        .strip_prefix("0x")
        .or_else(|| candidate.strip_prefix("0X"))
        .unwrap_or(candidate);
    Address::from_str(hex).ok()
}

/// Parse a positive ether amount into wei.
///
/// Rejects empty, non-numeric, zero and negative input as well as amounts
/// finer than one wei.
pub fn parse_positive_amount(raw: &str) -> Option<U256> {
    let trimmed = raw.trim();
    let numeric = trimmed.parse::<f64>().ok()?;
    if !numeric.is_finite() || numeric <= 0.0 {
        return None;
    }

    to_wei(trimmed).ok().filter(|wei| !wei.is_zero())
}
