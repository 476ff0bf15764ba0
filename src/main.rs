// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use bank_dashboard_gateway::{
    api::router,
    config::{AppConfig, LedgerBackend, LogFormat, DEFAULT_LOG_FILTER},
    state::AppState,
    wallet::AccountWatcher,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
    shutdown.cancel();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    init_tracing(config.log_format);

    let state = AppState::from_config(&config)?;
    let shutdown = CancellationToken::new();

    // Register for accountsChanged before anything can change the account.
    let listener = state.wallet.spawn_account_listener(shutdown.clone());

    if config.ledger_backend == LedgerBackend::Rpc {
        if let Some(wallet) = state.wallet.wallet() {
            let watcher = AccountWatcher::new(Arc::clone(wallet))
                .with_interval(config.account_poll_interval);
            tokio::spawn(watcher.run(shutdown.clone()));
        }
    }

    state.wallet.initialize().await;

    let app = router(state);
    let addr = config.bind_addr()?;
    let tcp = tokio::net::TcpListener::bind(addr).await?;

    info!(
        %addr,
        bank_api = %config.bank_api_url,
        backend = ?config.ledger_backend,
        "Bank dashboard gateway listening (docs at /docs)"
    );

    axum::serve(tcp, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    if let Some(listener) = listener {
        if let Err(e) = listener.await {
            error!(error = %e, "Account listener ended abnormally");
        }
    }

    info!("Server stopped");
    Ok(())
}
