// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Traditional tab: proxies to the REST banking API.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    bank::BankAction,
    error::ApiError,
    models::{AmountRequest, BankResponse, BankTransferRequest},
    state::AppState,
};

fn reply(action: BankAction, account: Option<crate::bank::Account>) -> Json<BankResponse> {
    Json(BankResponse {
        message: action.success_message().to_string(),
        account,
    })
}

#[utoipa::path(
    post,
    path = "/v1/bank/accounts",
    tag = "Bank",
    responses(
        (status = 200, description = "Account created", body = BankResponse),
        (status = 502, description = "Banking API failed")
    )
)]
pub async fn create_account(State(state): State<AppState>) -> Result<Json<BankResponse>, ApiError> {
    let action = BankAction::CreateAccount;
    let account = state
        .bank
        .create_account()
        .await
        .map_err(|e| ApiError::from_bank(action, e))?;
    Ok(reply(action, Some(account)))
}

#[utoipa::path(
    get,
    path = "/v1/bank/accounts/{account_id}",
    tag = "Bank",
    params(("account_id" = String, Path, description = "Bank account ID")),
    responses(
        (status = 200, description = "Fetched balance", body = BankResponse),
        (status = 404, description = "Account not found"),
        (status = 502, description = "Banking API failed")
    )
)]
pub async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<Json<BankResponse>, ApiError> {
    let action = BankAction::FetchBalance;
    let account = state
        .bank
        .get_account(&account_id)
        .await
        .map_err(|e| ApiError::from_bank(action, e))?;
    Ok(reply(action, Some(account)))
}

#[utoipa::path(
    post,
    path = "/v1/bank/accounts/{account_id}/deposit",
    tag = "Bank",
    params(("account_id" = String, Path, description = "Bank account ID")),
    request_body = AmountRequest,
    responses(
        (status = 200, description = "Deposit successful", body = BankResponse),
        (status = 422, description = "Invalid account ID or amount"),
        (status = 502, description = "Banking API failed")
    )
)]
pub async fn deposit(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Json(request): Json<AmountRequest>,
) -> Result<Json<BankResponse>, ApiError> {
    let action = BankAction::Deposit;
    let account = state
        .bank
        .deposit(&account_id, &request.amount.as_input())
        .await
        .map_err(|e| ApiError::from_bank(action, e))?;
    Ok(reply(action, Some(account)))
}

#[utoipa::path(
    post,
    path = "/v1/bank/accounts/{account_id}/withdraw",
    tag = "Bank",
    params(("account_id" = String, Path, description = "Bank account ID")),
    request_body = AmountRequest,
    responses(
        (status = 200, description = "Withdrawal successful", body = BankResponse),
        (status = 400, description = "Rejected by the bank, e.g. insufficient funds"),
        (status = 422, description = "Invalid account ID or amount"),
        (status = 502, description = "Banking API failed")
    )
)]
pub async fn withdraw(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Json(request): Json<AmountRequest>,
) -> Result<Json<BankResponse>, ApiError> {
    let action = BankAction::Withdraw;
    let account = state
        .bank
        .withdraw(&account_id, &request.amount.as_input())
        .await
        .map_err(|e| ApiError::from_bank(action, e))?;
    Ok(reply(action, Some(account)))
}

#[utoipa::path(
    post,
    path = "/v1/bank/transfer",
    tag = "Bank",
    request_body = BankTransferRequest,
    responses(
        (status = 200, description = "Transfer successful", body = BankResponse),
        (status = 400, description = "Rejected by the bank"),
        (status = 422, description = "Missing account IDs or invalid amount"),
        (status = 502, description = "Banking API failed")
    )
)]
pub async fn transfer(
    State(state): State<AppState>,
    Json(request): Json<BankTransferRequest>,
) -> Result<Json<BankResponse>, ApiError> {
    let action = BankAction::Transfer;
    state
        .bank
        .transfer(
            &request.from_account_id,
            &request.to_account_id,
            &request.amount.as_input(),
        )
        .await
        .map_err(|e| ApiError::from_bank(action, e))?;
    Ok(reply(action, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawAmount;
    use axum::http::StatusCode;

    /// Nothing listens on port 9 locally, so any request fails at transport.
    fn state() -> AppState {
        AppState::in_memory("http://127.0.0.1:9").unwrap()
    }

    #[tokio::test]
    async fn invalid_amount_is_unprocessable() {
        let err = deposit(
            State(state()),
            Path("1".to_string()),
            Json(AmountRequest {
                amount: RawAmount::Text("-5".into()),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.message, "Please enter a valid amount to deposit.");
    }

    #[tokio::test]
    async fn transfer_requires_both_ids() {
        let err = transfer(
            State(state()),
            Json(BankTransferRequest {
                from_account_id: "1".into(),
                to_account_id: " ".into(),
                amount: RawAmount::Number(10.0),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            err.message,
            "Please enter both source and destination account IDs."
        );
    }

    #[tokio::test]
    async fn unreachable_bank_is_bad_gateway() {
        let err = create_account(State(state())).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert!(err.message.starts_with("Failed to create account: "));
    }
}
