//! Listing lifecycle service binary.
//!
//! Reads configuration from the environment once at startup (missing
//! required values are fatal), wires the production gateway and store into
//! the lifecycle engine, and serves the order endpoints.

use std::sync::Arc;

use plaza::{
    http, AppConfig, LifecycleEngine, PayPalClient, PlanPricing, RtdbStore, SystemTimeProvider,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        return;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    init_logging();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Startup aborted: {e}");
            std::process::exit(1);
        }
    };

    let gateway = match PayPalClient::new(
        config.paypal_client_id.clone(),
        config.paypal_client_secret.clone(),
        config.paypal_sandbox,
    ) {
        Ok(gateway) => gateway,
        Err(e) => {
            error!("Startup aborted: {e}");
            std::process::exit(1);
        }
    };

    let store = match RtdbStore::new(config.store_url.clone(), config.store_auth_token.clone()) {
        Ok(store) => store,
        Err(e) => {
            error!("Startup aborted: {e}");
            std::process::exit(1);
        }
    };

    let engine = Arc::new(LifecycleEngine::new(
        store,
        gateway,
        SystemTimeProvider::new(),
        PlanPricing::default(),
    ));

    let app = http::router(engine.clone(), &config.allowed_origins);

    let listener = match tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind port {}: {e}", config.port);
            std::process::exit(1);
        }
    };
    info!(
        "Listening on port {} ({} gateway)",
        config.port,
        if config.paypal_sandbox { "sandbox" } else { "live" }
    );

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {e}");
    }

    engine.shutdown();
    info!("Stopped");
}
