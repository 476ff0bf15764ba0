// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tracing::{info, warn};

use crate::bank::{BankApiError, RestBankClient};
use crate::blockchain::{
    ChainClientError, DeploymentManifest, MemoryLedger, MEMORY_CONTRACT_ADDRESS, MEMORY_NETWORK_ID,
};
use crate::config::{AppConfig, LedgerBackend};
use crate::wallet::{RpcWalletProvider, StaticWalletProvider, WalletProvider, WalletSyncController};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Bank(#[from] BankApiError),

    #[error(transparent)]
    Chain(#[from] ChainClientError),
}

#[derive(Clone)]
pub struct AppState {
    pub bank: RestBankClient,
    pub wallet: Arc<WalletSyncController>,
}

impl AppState {
    pub fn new(bank: RestBankClient, wallet: WalletSyncController) -> Self {
        Self {
            bank,
            wallet: Arc::new(wallet),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let bank = RestBankClient::new(&config.bank_api_url)?;

        let (wallet, manifest) = match config.ledger_backend {
            LedgerBackend::Memory => {
                info!("Using in-process ledger and wallet");
                in_memory_wallet()
            }
            LedgerBackend::Rpc => {
                let wallet = match config.wallet_rpc_url.as_deref() {
                    Some(url) => {
                        info!(rpc_url = %url, "Using JSON-RPC wallet");
                        Some(Arc::new(RpcWalletProvider::connect(url)?) as Arc<dyn WalletProvider>)
                    }
                    None => {
                        warn!("WALLET_RPC_URL not set, running without a wallet provider");
                        None
                    }
                };

                // A missing artifact surfaces later as "no deployment" for the
                // wallet's network.
                let manifest = DeploymentManifest::from_path(&config.deployment_manifest)
                    .unwrap_or_else(|e| {
                        warn!(error = %e, "Failed to load deployment manifest");
                        DeploymentManifest::default()
                    });

                (wallet, manifest)
            }
        };

        Ok(Self::new(bank, WalletSyncController::new(wallet, manifest)))
    }

    /// State backed by the in-process ledger; the bank client points at
    /// `bank_api_url` but is never called until a bank route is hit.
    pub fn in_memory(bank_api_url: &str) -> Result<Self, StartupError> {
        let bank = RestBankClient::new(bank_api_url)?;
        let (wallet, manifest) = in_memory_wallet();
        Ok(Self::new(bank, WalletSyncController::new(wallet, manifest)))
    }
}

fn in_memory_wallet() -> (Option<Arc<dyn WalletProvider>>, DeploymentManifest) {
    let wallet: Arc<dyn WalletProvider> =
        Arc::new(StaticWalletProvider::with_dev_accounts(MemoryLedger::new()));
    (
        Some(wallet),
        DeploymentManifest::single(MEMORY_NETWORK_ID, MEMORY_CONTRACT_ADDRESS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| {
            vars.iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    #[tokio::test]
    async fn rpc_backend_without_url_has_no_wallet() {
        let state = AppState::from_config(&config(&[])).unwrap();
        assert!(state.wallet.wallet().is_none());
        assert!(!state.wallet.view().await.wallet_available);
    }

    #[tokio::test]
    async fn memory_backend_resolves_contract() {
        let state = AppState::from_config(&config(&[("LEDGER_BACKEND", "memory")])).unwrap();
        state.wallet.initialize().await;

        let view = state.wallet.view().await;
        assert_eq!(
            view.contract_address,
            Some(MEMORY_CONTRACT_ADDRESS.to_string())
        );
        assert!(view.active_address.is_some());
    }

    #[test]
    fn invalid_bank_url_fails_startup() {
        assert!(matches!(
            AppState::from_config(&config(&[("BANK_API_URL", "::nope")])),
            Err(StartupError::Bank(_))
        ));
    }
}
