// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    bank::Account,
    blockchain::TxReceipt,
    models::{
        AccountsChangedRequest, AmountRequest, BankResponse, BankTransferRequest,
        ChainActionResponse, ChainTransferRequest, OutcomeKind, RecipientRequest, WalletAddress,
    },
    state::AppState,
    wallet::{ConnectionState, ControllerView},
};

pub mod bank;
pub mod chain;
pub mod health;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/bank/accounts", post(bank::create_account))
        .route("/bank/accounts/{account_id}", get(bank::get_account))
        .route("/bank/accounts/{account_id}/deposit", post(bank::deposit))
        .route("/bank/accounts/{account_id}/withdraw", post(bank::withdraw))
        .route("/bank/transfer", post(bank::transfer))
        .route("/chain/state", get(chain::get_state))
        .route("/chain/connect", post(chain::connect))
        .route("/chain/refresh", post(chain::refresh))
        .route("/chain/recipient", put(chain::set_recipient))
        .route("/chain/balances/{address}", get(chain::get_balance))
        .route("/chain/accounts", post(chain::create_account))
        .route("/chain/deposit", post(chain::deposit))
        .route("/chain/withdraw", post(chain::withdraw))
        .route("/chain/transfer", post(chain::transfer))
        .route("/chain/accounts-changed", post(chain::accounts_changed))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        bank::create_account,
        bank::get_account,
        bank::deposit,
        bank::withdraw,
        bank::transfer,
        chain::get_state,
        chain::connect,
        chain::refresh,
        chain::set_recipient,
        chain::get_balance,
        chain::create_account,
        chain::deposit,
        chain::withdraw,
        chain::transfer,
        chain::accounts_changed
    ),
    components(
        schemas(
            Account,
            AmountRequest,
            BankResponse,
            BankTransferRequest,
            RecipientRequest,
            ChainTransferRequest,
            AccountsChangedRequest,
            ChainActionResponse,
            OutcomeKind,
            TxReceipt,
            ControllerView,
            ConnectionState,
            WalletAddress,
            chain::AddressBalance,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Bank", description = "Traditional banking tab (REST banking API)"),
        (name = "Chain", description = "Blockchain tab (wallet session and BankBlockchain contract)")
    )
)]
struct ApiDoc;
