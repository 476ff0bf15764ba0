// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::bank::{BankAction, BankApiError};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    /// Map a banking API failure for `action` to a response.
    ///
    /// Validation errors pass through as 422 with their own wording. Upstream
    /// 4xx keep their status; everything else becomes 502.
    pub fn from_bank(action: BankAction, err: BankApiError) -> Self {
        match err {
            BankApiError::Validation(message) => Self::unprocessable(message),
            BankApiError::Rejected { status, .. } if (400..500).contains(&status) => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                Self::new(status, action.failure_message(&err))
            }
            other => {
                error!(error = %other, ?action, "Banking API call failed");
                Self::bad_gateway(action.failure_message(&other))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.message, "bad");

        let unp = ApiError::unprocessable("oops");
        assert_eq!(unp.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(unp.message, "oops");

        let gw = ApiError::bad_gateway("upstream");
        assert_eq!(gw.status, StatusCode::BAD_GATEWAY);

        let down = ApiError::service_unavailable("later");
        assert_eq!(down.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn bank_errors_map_to_statuses() {
        let validation = ApiError::from_bank(
            BankAction::Deposit,
            BankApiError::Validation("Please enter an account ID."),
        );
        assert_eq!(validation.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(validation.message, "Please enter an account ID.");

        let rejected = ApiError::from_bank(
            BankAction::Withdraw,
            BankApiError::Rejected {
                status: 400,
                message: "Insufficient funds".into(),
            },
        );
        assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
        assert_eq!(rejected.message, "Withdrawal failed: Insufficient funds");

        let upstream = ApiError::from_bank(
            BankAction::CreateAccount,
            BankApiError::Rejected {
                status: 500,
                message: "HTTP error! status: 500".into(),
            },
        );
        assert_eq!(upstream.status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            upstream.message,
            "Failed to create account: HTTP error! status: 500"
        );

        let down = ApiError::from_bank(
            BankAction::FetchBalance,
            BankApiError::Transport("connection refused".into()),
        );
        assert_eq!(down.status, StatusCode::BAD_GATEWAY);
        assert_eq!(down.message, "Failed to fetch balance: connection refused");
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }
}
