// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON-RPC connection to an EVM node.
//!
//! The node plays the part of the browser wallet: it holds the unlocked
//! accounts, answers `eth_requestAccounts`/`eth_accounts`, and signs the
//! transactions we submit with `eth_sendTransaction`.

use alloy::providers::{DynProvider, Provider, ProviderBuilder};

/// Build a type-erased HTTP provider for the given RPC endpoint.
///
/// No wallet filler is attached, so transactions are sent unsigned and the
/// node signs them with its own account.
pub fn connect_http(rpc_url: &str) -> Result<DynProvider, ChainClientError> {
    let url: url::Url = rpc_url
        .parse()
        .map_err(|e: url::ParseError| ChainClientError::InvalidRpcUrl(e.to_string()))?;

    Ok(ProviderBuilder::new().connect_http(url).erased())
}

/// Errors that can occur during wallet or contract operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainClientError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Contract error: {0}")]
    ContractError(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("No deployed network found for this ID ({0})")]
    NoDeployment(u64),

    #[error("Deployment manifest error: {0}")]
    Manifest(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_http_rejects_malformed_url() {
        let err = connect_http("not a url").unwrap_err();
        assert!(matches!(err, ChainClientError::InvalidRpcUrl(_)));
    }

    #[test]
    fn no_deployment_message_names_the_network() {
        let err = ChainClientError::NoDeployment(5777);
        assert_eq!(err.to_string(), "No deployed network found for this ID (5777)");
    }
}
