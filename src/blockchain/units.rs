// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Conversion between wei and the ether strings the dashboard shows.

use alloy::primitives::{utils::format_ether, U256};

use super::client::ChainClientError;

/// Fractional digits of one ether.
const WEI_DIGITS: usize = 18;

fn pow10(exponent: usize) -> U256 {
    U256::from(10u64).pow(U256::from(exponent))
}

fn digits(part: &str, amount: &str) -> Result<U256, ChainClientError> {
    if part.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(part, 10)
        .map_err(|_| ChainClientError::InvalidAmount(format!("{amount}: amount out of range")))
}

/// Parse a plain decimal ether amount ("1", "0.5", ".5", "1.") into wei.
///
/// Signs, exponents and precision finer than one wei are rejected.
pub fn to_wei(amount: &str) -> Result<U256, ChainClientError> {
    let amount = amount.trim();
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));

    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(ChainClientError::InvalidAmount(format!(
            "{amount}: not a decimal ether amount"
        )));
    }
    if fraction.len() > WEI_DIGITS {
        return Err(ChainClientError::InvalidAmount(format!(
            "{amount}: more than {WEI_DIGITS} decimal places"
        )));
    }

    let fraction_wei = digits(fraction, amount)? * pow10(WEI_DIGITS - fraction.len());
    digits(whole, amount)?
        .checked_mul(pow10(WEI_DIGITS))
        .and_then(|wei| wei.checked_add(fraction_wei))
        .ok_or_else(|| ChainClientError::InvalidAmount(format!("{amount}: amount out of range")))
}

/// Wei as ether with every significant digit and no trailing zeros.
pub fn from_wei(amount: U256) -> String {
    let formatted = format_ether(amount);
    if !formatted.contains('.') {
        return formatted;
    }
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_ETHER: u64 = 1_000_000_000_000_000_000;

    #[test]
    fn whole_and_fractional_ether() {
        assert_eq!(to_wei("1").unwrap(), U256::from(ONE_ETHER));
        assert_eq!(to_wei(" 2 ").unwrap(), U256::from(2 * ONE_ETHER));
        assert_eq!(to_wei("0.5").unwrap(), U256::from(ONE_ETHER / 2));
        assert_eq!(to_wei(".5").unwrap(), U256::from(ONE_ETHER / 2));
        assert_eq!(to_wei("1.").unwrap(), U256::from(ONE_ETHER));
        assert_eq!(to_wei("0.000000000000000001").unwrap(), U256::from(1u64));
    }

    #[test]
    fn rejects_non_decimal_input() {
        for bad in ["", ".", "abc", "1.2.3", "-1", "+1", "1e5", "0x10", "0.0000000000000000001"] {
            assert!(to_wei(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn rejects_amounts_beyond_u256() {
        let huge = "9".repeat(80);
        assert!(to_wei(&huge).is_err());
    }

    #[test]
    fn formats_without_trailing_zeros() {
        assert_eq!(from_wei(U256::from(ONE_ETHER)), "1");
        assert_eq!(from_wei(U256::from(10 * ONE_ETHER)), "10");
        assert_eq!(from_wei(U256::from(ONE_ETHER / 2)), "0.5");
        assert_eq!(from_wei(U256::from(1u64)), "0.000000000000000001");
        assert_eq!(from_wei(U256::ZERO), "0");
    }

    #[test]
    fn formatting_reproduces_parsed_input() {
        for amount in ["1.25", "0.001", "42"] {
            assert_eq!(from_wei(to_wei(amount).unwrap()), amount);
        }
    }
}
