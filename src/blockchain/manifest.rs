// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Deployment manifest (truffle build artifact) for the BankBlockchain contract.
//!
//! Only the fields needed to locate the contract are read:
//!
//! ```json
//! {
//!   "contractName": "BankBlockchain",
//!   "abi": [ ... ],
//!   "networks": { "5777": { "address": "0x..." } }
//! }
//! ```

use std::{collections::HashMap, path::Path, str::FromStr};

use alloy::primitives::Address;
use serde::Deserialize;

use super::client::ChainClientError;

/// Address of the contract on one network.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDeployment {
    pub address: String,
    #[serde(default)]
    pub transaction_hash: Option<String>,
}

/// Static mapping from network identifier to deployed contract.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentManifest {
    #[serde(default)]
    pub contract_name: String,
    #[serde(default)]
    pub abi: serde_json::Value,
    #[serde(default)]
    pub networks: HashMap<String, NetworkDeployment>,
}

impl DeploymentManifest {
    pub fn from_json(raw: &str) -> Result<Self, ChainClientError> {
        serde_json::from_str(raw).map_err(|e| ChainClientError::Manifest(e.to_string()))
    }

    pub fn from_path(path: &Path) -> Result<Self, ChainClientError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ChainClientError::Manifest(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    /// Manifest with a single deployment.
    pub fn single(network_id: u64, address: Address) -> Self {
        let mut networks = HashMap::new();
        networks.insert(
            network_id.to_string(),
            NetworkDeployment {
                address: address.to_string(),
                transaction_hash: None,
            },
        );
        Self {
            contract_name: "BankBlockchain".to_string(),
            abi: serde_json::Value::Array(Vec::new()),
            networks,
        }
    }

    /// Resolve the contract address recorded for `network_id`.
    pub fn deployment_for(&self, network_id: u64) -> Result<Address, ChainClientError> {
        let deployment = self
            .networks
            .get(&network_id.to_string())
            .ok_or(ChainClientError::NoDeployment(network_id))?;

        Address::from_str(&deployment.address)
            .map_err(|e| ChainClientError::InvalidAddress(format!("{}: {}", deployment.address, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ARTIFACT: &str = r#"{
        "contractName": "BankBlockchain",
        "abi": [],
        "networks": {
            "5777": {
                "address": "0x5FbDB2315678afecb367f032d93F642f64180aa3",
                "transactionHash": "0xabc"
            }
        }
    }"#;

    #[test]
    fn resolves_known_network() {
        let manifest = DeploymentManifest::from_json(ARTIFACT).unwrap();
        let address = manifest.deployment_for(5777).unwrap();
        assert_eq!(
            address,
            Address::from_str("0x5FbDB2315678afecb367f032d93F642f64180aa3").unwrap()
        );
        assert_eq!(manifest.contract_name, "BankBlockchain");
    }

    #[test]
    fn unknown_network_is_no_deployment() {
        let manifest = DeploymentManifest::from_json(ARTIFACT).unwrap();
        assert_eq!(
            manifest.deployment_for(1).unwrap_err(),
            ChainClientError::NoDeployment(1)
        );
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ARTIFACT.as_bytes()).unwrap();

        let manifest = DeploymentManifest::from_path(file.path()).unwrap();
        assert!(manifest.deployment_for(5777).is_ok());
    }

    #[test]
    fn missing_file_is_manifest_error() {
        let err = DeploymentManifest::from_path(Path::new("/nonexistent/BankBlockchain.json"))
            .unwrap_err();
        assert!(matches!(err, ChainClientError::Manifest(_)));
    }

    #[test]
    fn single_round_trips_address() {
        let address = Address::from_str("0x5FbDB2315678afecb367f032d93F642f64180aa3").unwrap();
        let manifest = DeploymentManifest::single(31337, address);
        assert_eq!(manifest.deployment_for(31337).unwrap(), address);
    }
}
