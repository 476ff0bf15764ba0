// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain tab: wallet session and BankBlockchain contract operations.
//!
//! Contract operations always answer 200 with the published state; failures
//! are reported through its `message` the same way the dashboard shows them.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::ApiError,
    models::{
        AccountsChangedRequest, AmountRequest, ChainActionResponse, ChainTransferRequest,
        OutcomeKind, RecipientRequest,
    },
    state::AppState,
    wallet::{ConnectOutcome, ControllerView, OperationOutcome, NO_WALLET_MESSAGE},
};

async fn respond(
    state: &AppState,
    outcome: OperationOutcome,
) -> Json<ChainActionResponse> {
    let (outcome, receipt) = match outcome {
        OperationOutcome::Rejected => (OutcomeKind::Rejected, None),
        OperationOutcome::Failed => (OutcomeKind::Failed, None),
        OperationOutcome::Succeeded(receipt) => (OutcomeKind::Succeeded, Some(receipt)),
    };
    Json(ChainActionResponse {
        outcome,
        receipt,
        state: state.wallet.view().await,
    })
}

/// Balance of a single address.
#[derive(Debug, Serialize, ToSchema)]
pub struct AddressBalance {
    pub address: String,
    /// Ether balance; "0" for unknown accounts
    pub balance: String,
}

#[utoipa::path(
    get,
    path = "/v1/chain/state",
    tag = "Chain",
    responses((status = 200, description = "Current wallet session and balances", body = ControllerView))
)]
pub async fn get_state(State(state): State<AppState>) -> Json<ControllerView> {
    Json(state.wallet.view().await)
}

#[utoipa::path(
    post,
    path = "/v1/chain/connect",
    tag = "Chain",
    responses((status = 200, description = "Connect attempt result", body = ChainActionResponse))
)]
pub async fn connect(State(state): State<AppState>) -> Json<ChainActionResponse> {
    let outcome = match state.wallet.connect().await {
        ConnectOutcome::Connected(_) => OutcomeKind::Connected,
        ConnectOutcome::NoAccounts => OutcomeKind::NoAccounts,
        ConnectOutcome::Failed => OutcomeKind::Failed,
        ConnectOutcome::AlreadyConnecting => OutcomeKind::AlreadyConnecting,
        ConnectOutcome::Unavailable => OutcomeKind::Unavailable,
    };
    Json(ChainActionResponse {
        outcome,
        receipt: None,
        state: state.wallet.view().await,
    })
}

#[utoipa::path(
    post,
    path = "/v1/chain/refresh",
    tag = "Chain",
    responses((status = 200, description = "Balances resynced", body = ControllerView))
)]
pub async fn refresh(State(state): State<AppState>) -> Json<ControllerView> {
    state.wallet.resync().await;
    Json(state.wallet.view().await)
}

#[utoipa::path(
    put,
    path = "/v1/chain/recipient",
    tag = "Chain",
    request_body = RecipientRequest,
    responses((status = 200, description = "Recipient updated", body = ControllerView))
)]
pub async fn set_recipient(
    State(state): State<AppState>,
    Json(request): Json<RecipientRequest>,
) -> Json<ControllerView> {
    state.wallet.set_recipient(request.recipient).await;
    Json(state.wallet.view().await)
}

#[utoipa::path(
    get,
    path = "/v1/chain/balances/{address}",
    tag = "Chain",
    params(("address" = String, Path, description = "Account address")),
    responses((status = 200, description = "Ether balance on the contract", body = AddressBalance))
)]
pub async fn get_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Json<AddressBalance> {
    let balance = state.wallet.fetch_balance(&address).await;
    Json(AddressBalance { address, balance })
}

#[utoipa::path(
    post,
    path = "/v1/chain/accounts",
    tag = "Chain",
    responses((status = 200, description = "Create-account result", body = ChainActionResponse))
)]
pub async fn create_account(State(state): State<AppState>) -> Json<ChainActionResponse> {
    let outcome = state.wallet.create_account().await;
    respond(&state, outcome).await
}

#[utoipa::path(
    post,
    path = "/v1/chain/deposit",
    tag = "Chain",
    request_body = AmountRequest,
    responses((status = 200, description = "Deposit result", body = ChainActionResponse))
)]
pub async fn deposit(
    State(state): State<AppState>,
    Json(request): Json<AmountRequest>,
) -> Json<ChainActionResponse> {
    let outcome = state.wallet.deposit(&request.amount.as_input()).await;
    respond(&state, outcome).await
}

#[utoipa::path(
    post,
    path = "/v1/chain/withdraw",
    tag = "Chain",
    request_body = AmountRequest,
    responses((status = 200, description = "Withdrawal result", body = ChainActionResponse))
)]
pub async fn withdraw(
    State(state): State<AppState>,
    Json(request): Json<AmountRequest>,
) -> Json<ChainActionResponse> {
    let outcome = state.wallet.withdraw(&request.amount.as_input()).await;
    respond(&state, outcome).await
}

#[utoipa::path(
    post,
    path = "/v1/chain/transfer",
    tag = "Chain",
    request_body = ChainTransferRequest,
    responses((status = 200, description = "Transfer result", body = ChainActionResponse))
)]
pub async fn transfer(
    State(state): State<AppState>,
    Json(request): Json<ChainTransferRequest>,
) -> Json<ChainActionResponse> {
    if let Some(to) = request.to {
        state.wallet.set_recipient(Some(to)).await;
    }
    let outcome = state.wallet.transfer(&request.amount.as_input()).await;
    respond(&state, outcome).await
}

/// Deliver an `accountsChanged` notification through the wallet provider.
///
/// Processing is asynchronous; poll `/v1/chain/state` for the result.
#[utoipa::path(
    post,
    path = "/v1/chain/accounts-changed",
    tag = "Chain",
    request_body = AccountsChangedRequest,
    responses(
        (status = 202, description = "Notification delivered"),
        (status = 422, description = "Invalid address in the list"),
        (status = 503, description = "No wallet provider configured")
    )
)]
pub async fn accounts_changed(
    State(state): State<AppState>,
    Json(request): Json<AccountsChangedRequest>,
) -> Result<StatusCode, ApiError> {
    let wallet = state
        .wallet
        .wallet()
        .ok_or_else(|| ApiError::service_unavailable(NO_WALLET_MESSAGE))?;

    let accounts = request
        .accounts
        .iter()
        .map(|account| {
            account
                .parse()
                .ok_or_else(|| ApiError::unprocessable(format!("Invalid account address: {account}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    wallet.announce_accounts(accounts);
    Ok(StatusCode::ACCEPTED)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::models::{RawAmount, WalletAddress};
    use crate::wallet::{ConnectionState, DEFAULT_DEV_ACCOUNTS};

    async fn connected_state() -> AppState {
        let state = AppState::in_memory("http://127.0.0.1:9").unwrap();
        state.wallet.initialize().await;
        state
    }

    fn amount(raw: &str) -> Json<AmountRequest> {
        Json(AmountRequest {
            amount: RawAmount::Text(raw.to_string()),
        })
    }

    #[tokio::test]
    async fn deposit_then_transfer_updates_snapshot() {
        let state = connected_state().await;
        let alice = DEFAULT_DEV_ACCOUNTS[0].to_string();
        let bob = DEFAULT_DEV_ACCOUNTS[1].to_string();

        let Json(created) = create_account(State(state.clone())).await;
        assert_eq!(created.outcome, OutcomeKind::Succeeded);
        assert!(created.receipt.is_some());

        let Json(deposited) = deposit(State(state.clone()), amount("2")).await;
        assert_eq!(deposited.state.balances[&alice], "2");

        // recipient has no account yet, so the contract reverts
        let Json(failed) = transfer(
            State(state.clone()),
            Json(ChainTransferRequest {
                amount: RawAmount::Text("1".into()),
                to: Some(bob.clone()),
            }),
        )
        .await;
        assert_eq!(failed.outcome, OutcomeKind::Failed);
        assert_eq!(failed.state.balances[&bob], "0");
        assert!(failed
            .state
            .message
            .unwrap()
            .contains("Recipient account does not exist"));
    }

    #[tokio::test]
    async fn invalid_deposit_is_rejected_with_message() {
        let state = connected_state().await;

        let Json(response) = deposit(State(state), amount("zero")).await;
        assert_eq!(response.outcome, OutcomeKind::Rejected);
        assert_eq!(
            response.state.message.as_deref(),
            Some("Invalid deposit amount.")
        );
    }

    #[tokio::test]
    async fn second_connect_keeps_session() {
        let state = connected_state().await;

        let Json(response) = connect(State(state)).await;
        assert_eq!(response.outcome, OutcomeKind::Connected);
        assert_eq!(response.state.connection, ConnectionState::Connected);
    }

    #[tokio::test]
    async fn balance_of_unknown_account_is_zero() {
        let state = connected_state().await;
        let Json(balance) =
            get_balance(State(state), Path(DEFAULT_DEV_ACCOUNTS[1].to_string())).await;
        assert_eq!(balance.balance, "0");
    }

    #[tokio::test]
    async fn accounts_changed_rejects_bad_addresses() {
        let state = connected_state().await;
        let err = accounts_changed(
            State(state),
            Json(AccountsChangedRequest {
                accounts: vec![WalletAddress::from("0xnope")],
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn accounts_changed_reaches_the_listener() {
        let state = connected_state().await;
        let shutdown = CancellationToken::new();
        let listener = state
            .wallet
            .spawn_account_listener(shutdown.clone())
            .unwrap();

        let bob = DEFAULT_DEV_ACCOUNTS[1].to_string();
        let status = accounts_changed(
            State(state.clone()),
            Json(AccountsChangedRequest {
                accounts: vec![WalletAddress(bob.clone())],
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::ACCEPTED);

        tokio::time::timeout(Duration::from_secs(5), async {
            while state.wallet.view().await.active_address.as_deref() != Some(bob.as_str()) {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("listener switched account");

        shutdown.cancel();
        listener.await.unwrap();
    }
}
