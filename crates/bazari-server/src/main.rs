#![forbid(unsafe_code)]

use bazari_server::{
    build_router, validate_startup_config, AppState, GoogleTokenVerifier, LogMailer,
    ServerConfig,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    if let Err(err) = validate_startup_config(&config) {
        error!("invalid configuration: {err}");
        std::process::exit(1);
    }

    let store = match bazari_store::SqliteStore::open(&config.database_path) {
        Ok(store) => Arc::new(store.with_atomic_history_append(config.atomic_history_append)),
        Err(err) => {
            error!(path = %config.database_path.display(), "store open failed: {err}");
            std::process::exit(1);
        }
    };

    let bind_addr = config.bind_addr.clone();
    let verifier = Arc::new(GoogleTokenVerifier::new(config.google_client_id.clone()));
    let state = AppState::new(config, store, verifier, Arc::new(LogMailer));
    let app = build_router(state);

    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("bind {bind_addr} failed: {err}");
            std::process::exit(1);
        }
    };
    info!("listening on {bind_addr}");
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("server terminated: {err}");
        std::process::exit(1);
    }
}
