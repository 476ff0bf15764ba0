// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet session state and the connect admission gate.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use alloy::primitives::Address;
use serde::Serialize;
use utoipa::ToSchema;

use crate::blockchain::BankLedger;

/// Connection lifecycle of the wallet session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Active account plus the resolved contract handle.
///
/// Replaced as a whole whenever either part changes.
#[derive(Clone, Default)]
pub struct Session {
    pub active_address: Option<Address>,
    pub contract: Option<Arc<dyn BankLedger>>,
}

impl Session {
    pub fn with_active(&self, active_address: Option<Address>) -> Self {
        Self {
            active_address,
            contract: self.contract.clone(),
        }
    }

    pub fn with_contract(&self, contract: Option<Arc<dyn BankLedger>>) -> Self {
        Self {
            active_address: self.active_address,
            contract,
        }
    }

    pub fn contract_address(&self) -> Option<Address> {
        self.contract.as_ref().map(|c| c.address())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("active_address", &self.active_address)
            .field("contract", &self.contract_address())
            .finish()
    }
}

/// Single-slot gate that lets one connect attempt run at a time.
#[derive(Debug, Default)]
pub struct ConnectGate {
    busy: AtomicBool,
}

impl ConnectGate {
    /// Claim the slot, or `None` if a connect attempt is already in flight.
    pub fn try_acquire(&self) -> Option<ConnectPermit<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ConnectPermit { gate: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Held for the duration of a connect attempt; frees the gate on drop.
#[derive(Debug)]
pub struct ConnectPermit<'a> {
    gate: &'a ConnectGate,
}

impl Drop for ConnectPermit<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::MemoryLedger;

    #[test]
    fn gate_admits_one_at_a_time() {
        let gate = ConnectGate::default();
        let permit = gate.try_acquire().expect("first acquire");
        assert!(gate.is_busy());
        assert!(gate.try_acquire().is_none());

        drop(permit);
        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_some());
    }

    #[test]
    fn session_builders_keep_the_other_half() {
        let contract: Arc<dyn BankLedger> = Arc::new(MemoryLedger::new().at(Address::ZERO));
        let session = Session::default().with_contract(Some(contract));
        let switched = session.with_active(Some(Address::repeat_byte(1)));

        assert_eq!(switched.contract_address(), Some(Address::ZERO));
        assert_eq!(switched.active_address, Some(Address::repeat_byte(1)));
        assert_eq!(session.active_address, None);
    }
}
