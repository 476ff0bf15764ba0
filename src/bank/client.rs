// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP client for the traditional banking REST API.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use super::types::{Account, BankAction, ServerError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum BankApiError {
    /// Input rejected before any request was made.
    #[error("{0}")]
    Validation(&'static str),

    /// Non-2xx response; `message` is the server's own wording when it sent one.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("{0}")]
    Transport(String),

    #[error("invalid response from banking API: {0}")]
    InvalidResponse(String),

    #[error("invalid banking API URL: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Clone)]
pub struct RestBankClient {
    base_url: Url,
    http: Client,
}

impl RestBankClient {
    pub fn new(base_url: &str) -> Result<Self, BankApiError> {
        let base_url =
            Url::parse(base_url).map_err(|e| BankApiError::InvalidUrl(format!("{base_url}: {e}")))?;

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BankApiError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// `POST /accounts`
    pub async fn create_account(&self) -> Result<Account, BankApiError> {
        let account: Account = self
            .execute(self.http.post(self.endpoint("/accounts")), "POST /accounts")
            .await?;
        info!(account_id = account.id, "Bank account created");
        Ok(account)
    }

    /// `GET /accounts/{id}`
    pub async fn get_account(&self, account_id: &str) -> Result<Account, BankApiError> {
        let account_id = require_account_id(account_id)?;
        let path = format!("/accounts/{account_id}");
        self.execute(self.http.get(self.endpoint(&path)), &path).await
    }

    /// `POST /accounts/{id}/deposit` with the amount as a JSON number.
    pub async fn deposit(&self, account_id: &str, amount: &str) -> Result<Account, BankApiError> {
        self.move_funds(BankAction::Deposit, "deposit", account_id, amount)
            .await
    }

    /// `POST /accounts/{id}/withdraw` with the amount as a JSON number.
    pub async fn withdraw(&self, account_id: &str, amount: &str) -> Result<Account, BankApiError> {
        self.move_funds(BankAction::Withdraw, "withdraw", account_id, amount)
            .await
    }

    async fn move_funds(
        &self,
        action: BankAction,
        verb: &str,
        account_id: &str,
        amount: &str,
    ) -> Result<Account, BankApiError> {
        let account_id = require_account_id(account_id)?;
        let amount = require_amount(action, amount)?;

        let path = format!("/accounts/{account_id}/{verb}");
        let account: Account = self
            .execute(self.http.post(self.endpoint(&path)).json(&amount), &path)
            .await?;
        info!(account_id = account.id, amount, verb, "Bank balance updated");
        Ok(account)
    }

    /// `POST /accounts/transfer?fromAccountId&toAccountId&amount`
    pub async fn transfer(
        &self,
        from_account_id: &str,
        to_account_id: &str,
        amount: &str,
    ) -> Result<(), BankApiError> {
        let (Some(from), Some(to)) = (
            parse_account_id(from_account_id),
            parse_account_id(to_account_id),
        ) else {
            return Err(BankApiError::Validation(
                "Please enter both source and destination account IDs.",
            ));
        };
        let amount = require_amount(BankAction::Transfer, amount)?;

        let request = self
            .http
            .post(self.endpoint("/accounts/transfer"))
            .query(&[
                ("fromAccountId", from.to_string()),
                ("toAccountId", to.to_string()),
                ("amount", amount.to_string()),
            ]);
        self.send(request, "POST /accounts/transfer").await?;

        info!(from, to, amount, "Bank transfer completed");
        Ok(())
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        label: &str,
    ) -> Result<T, BankApiError> {
        self.send(request, label)
            .await?
            .json()
            .await
            .map_err(|e| BankApiError::InvalidResponse(format!("{label}: {e}")))
    }

    async fn send(
        &self,
        request: RequestBuilder,
        label: &str,
    ) -> Result<reqwest::Response, BankApiError> {
        debug!(request = label, "Calling banking API");
        let response = request.send().await.map_err(|e| {
            warn!(request = label, error = %e, "Banking API unreachable");
            BankApiError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ServerError>(&body)
            .ok()
            .and_then(|error| error.message)
            .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));

        warn!(request = label, status = status.as_u16(), message = %message, "Banking API rejected request");
        Err(BankApiError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// Account ids are the bank's numeric keys; anything else never reaches a URL.
fn parse_account_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

fn require_account_id(account_id: &str) -> Result<i64, BankApiError> {
    parse_account_id(account_id).ok_or(BankApiError::Validation("Please enter an account ID."))
}

/// Parse a positive, finite amount.
fn require_amount(action: BankAction, raw: &str) -> Result<f64, BankApiError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount > 0.0)
        .ok_or_else(|| BankApiError::Validation(action.invalid_amount_message()))
}
