//! HTTP surface: the order endpoints the checkout client talks to.

pub mod handlers;

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::lifecycle::LifecycleEngine;
use crate::traits::{ListingStore, PaymentGateway, TimeProvider};

/// Build the service router over a shared engine.
pub fn router<S, G, C>(
    engine: Arc<LifecycleEngine<S, G, C>>,
    allowed_origins: &[String],
) -> Router
where
    S: ListingStore + 'static,
    G: PaymentGateway + 'static,
    C: TimeProvider + 'static,
{
    Router::new()
        .route("/api/paypal/create-order", post(handlers::create_order))
        .route("/api/paypal/capture", post(handlers::capture))
        .route(
            "/api/paypal/verify-order/{order_id}/{listing_id}",
            get(handlers::verify_order),
        )
        .route("/healthz", get(handlers::healthz))
        .layer(cors_layer(allowed_origins))
        .with_state(engine)
}

/// Restrict cross-origin callers to the configured origins.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring unparsable CORS origin '{origin}'");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
