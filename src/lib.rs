use anyhow::Context;
use axum::serve;
use config::Config;
use routes::init_router;
use services::drain_fanouts;
use state::AppState;
use tokio::{net::TcpListener, signal};

pub mod auth;
pub mod config;
pub mod controllers;
pub mod db;
pub mod email;
pub mod error;
pub mod middlewares;
pub mod model;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;

pub async fn run() -> Result<(), anyhow::Error> {
    let config = Config::new().context("Failed to read configuration.")?;
    let address = config.application.get_address();
    let state = AppState::init(config).await?;
    let fanouts = state.fanouts.clone();
    let shutdown_grace = state.config.notifications.shutdown_grace();
    let router = init_router(state);

    tracing::info!("Starting server: {}", address);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed binding {}", address))?;
    serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    drain_fanouts(&fanouts, shutdown_grace).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed listening for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed listening for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received terminate signal, shutting down"),
    }
}
