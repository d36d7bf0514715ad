//! Main Entrypoint for the Delivery Agent API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing the rosbridge connector and the text generation client.
//! 3. Constructing the Axum router and applying middleware.
//! 4. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use delivery_api::{config::Config, router::create_router, state::AppState};
use delivery_core::{Assistant, DeliveryService, GemmaClient};
use rosbridge_client::WsConnector;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to install Ctrl+C handler");
        return;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize Shared Services ---
    // A fresh bridge connection is opened per operation, so nothing is dialled here.
    let connector = WsConnector::new(config.bridge_url.clone())
        .with_connect_timeout(config.bridge_connect_timeout);
    let delivery = Arc::new(DeliveryService::new(Arc::new(connector)));

    let generator = GemmaClient::new(config.gemma_url.clone(), config.gemma_api_key.clone());
    let assistant = Assistant::new(Arc::new(generator));

    let app_state = Arc::new(AppState {
        delivery,
        assistant,
    });

    // --- 4. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 5. Start Server ---
    info!(
        bridge_url = %config.bridge_url,
        gemma_url = %config.gemma_url,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
