// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the [`AppConfig`] loaded from
//! them at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8081` |
//! | `BANK_API_URL` | Base URL of the REST banking API | `http://localhost:8080` |
//! | `WALLET_RPC_URL` | JSON-RPC endpoint with unlocked accounts | unset (no wallet) |
//! | `LEDGER_BACKEND` | `rpc` (node + deployed contract) or `memory` | `rpc` |
//! | `DEPLOYMENT_MANIFEST` | Contract artifact with per-network deployments | `contracts/BankBlockchain.json` |
//! | `ACCOUNT_POLL_INTERVAL_SECS` | `eth_accounts` poll interval for the RPC wallet | `2` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{net::SocketAddr, path::PathBuf, time::Duration};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const BANK_API_URL_ENV: &str = "BANK_API_URL";

/// Environment variable for the wallet's JSON-RPC endpoint.
///
/// Leaving it unset runs the blockchain tab without a wallet provider: every
/// address is invalid and connect attempts report that no wallet is available.
/// Ignored by the `memory` backend, which brings its own wallet.
pub const WALLET_RPC_URL_ENV: &str = "WALLET_RPC_URL";

pub const LEDGER_BACKEND_ENV: &str = "LEDGER_BACKEND";

/// Environment variable for the contract artifact path.
///
/// The artifact is the JSON produced when the contract is compiled and
/// migrated; only its `networks` map is read.
pub const DEPLOYMENT_MANIFEST_ENV: &str = "DEPLOYMENT_MANIFEST";

pub const ACCOUNT_POLL_INTERVAL_ENV: &str = "ACCOUNT_POLL_INTERVAL_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8081;
pub const DEFAULT_BANK_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_DEPLOYMENT_MANIFEST: &str = "contracts/BankBlockchain.json";
pub const DEFAULT_ACCOUNT_POLL_INTERVAL_SECS: u64 = 2;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a valid port number, got {value:?}")]
    InvalidPort { name: &'static str, value: String },

    #[error("{name} must be a positive number of seconds, got {value:?}")]
    InvalidInterval { name: &'static str, value: String },

    #[error("{name} must be one of {expected}, got {value:?}")]
    UnknownVariant {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("invalid bind address {0}")]
    InvalidBindAddress(String),
}

/// Where the blockchain tab's wallet and contract come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerBackend {
    /// JSON-RPC node; contract resolved from the deployment manifest.
    Rpc,
    /// In-process ledger and wallet with two dev accounts.
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub bank_api_url: String,
    pub wallet_rpc_url: Option<String>,
    pub ledger_backend: LedgerBackend,
    pub deployment_manifest: PathBuf,
    pub account_poll_interval: Duration,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source. Empty values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match get(PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidPort {
                name: PORT_ENV,
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let account_poll_interval = match get(ACCOUNT_POLL_INTERVAL_ENV) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidInterval {
                        name: ACCOUNT_POLL_INTERVAL_ENV,
                        value: raw,
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_ACCOUNT_POLL_INTERVAL_SECS),
        };

        let ledger_backend = match get(LEDGER_BACKEND_ENV).as_deref() {
            None | Some("rpc") => LedgerBackend::Rpc,
            Some("memory") => LedgerBackend::Memory,
            Some(other) => {
                return Err(ConfigError::UnknownVariant {
                    name: LEDGER_BACKEND_ENV,
                    expected: "rpc, memory",
                    value: other.to_string(),
                })
            }
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::UnknownVariant {
                    name: LOG_FORMAT_ENV,
                    expected: "json, pretty",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            bank_api_url: get(BANK_API_URL_ENV).unwrap_or_else(|| DEFAULT_BANK_API_URL.to_string()),
            wallet_rpc_url: get(WALLET_RPC_URL_ENV),
            ledger_backend,
            deployment_manifest: get(DEPLOYMENT_MANIFEST_ENV)
                .unwrap_or_else(|| DEFAULT_DEPLOYMENT_MANIFEST.to_string())
                .into(),
            account_poll_interval,
            log_format,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse()
            .map_err(|_| ConfigError::InvalidBindAddress(raw))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, 8081);
        assert_eq!(config.bank_api_url, "http://localhost:8080");
        assert_eq!(config.wallet_rpc_url, None);
        assert_eq!(config.ledger_backend, LedgerBackend::Rpc);
        assert_eq!(
            config.deployment_manifest,
            PathBuf::from("contracts/BankBlockchain.json")
        );
        assert_eq!(config.account_poll_interval, Duration::from_secs(2));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.bind_addr().unwrap().port(), 8081);
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            (PORT_ENV, "9000"),
            (WALLET_RPC_URL_ENV, "http://127.0.0.1:8545"),
            (LEDGER_BACKEND_ENV, "memory"),
            (LOG_FORMAT_ENV, "json"),
            (ACCOUNT_POLL_INTERVAL_ENV, "5"),
            (HOST_ENV, "127.0.0.1"),
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.wallet_rpc_url.as_deref(), Some("http://127.0.0.1:8545"));
        assert_eq!(config.ledger_backend, LedgerBackend::Memory);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.account_poll_interval, Duration::from_secs(5));
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:9000");
    }

    #[test]
    fn empty_values_count_as_unset() {
        let config = load(&[(WALLET_RPC_URL_ENV, "  "), (PORT_ENV, "")]).unwrap();
        assert_eq!(config.wallet_rpc_url, None);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            load(&[(PORT_ENV, "http")]),
            Err(ConfigError::InvalidPort { .. })
        ));
        assert!(matches!(
            load(&[(ACCOUNT_POLL_INTERVAL_ENV, "0")]),
            Err(ConfigError::InvalidInterval { .. })
        ));
        assert!(matches!(
            load(&[(LEDGER_BACKEND_ENV, "ganache")]),
            Err(ConfigError::UnknownVariant { .. })
        ));
        assert!(load(&[(HOST_ENV, "not a host")])
            .unwrap()
            .bind_addr()
            .is_err());
    }
}
