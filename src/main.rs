// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::error::Error;

use cluster_auth::{
    api::router,
    config::{Config, Environment, LogFormat},
    observability::{init_tracing, metrics::init_metrics_recorder},
    state::AppState,
};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Local runs read secrets from .env; production takes the real environment.
    if Environment::from_process_env() != Environment::Production {
        dotenvy::dotenv().ok();
    }

    init_tracing(LogFormat::from_process_env());

    let config = Config::from_env().inspect_err(|e| error!(error = %e, "Invalid configuration"))?;
    info!(?config, "Loaded configuration");

    let metrics_handle = init_metrics_recorder()?;
    let addr = config.bind_address()?;
    let role = config.role;

    let state = AppState::new(config)?;
    let app = router(state, Some(metrics_handle));

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, %role, "Listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
