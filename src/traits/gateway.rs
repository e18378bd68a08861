//! Payment gateway abstraction for testable order operations.

use async_trait::async_trait;

use crate::error::PlazaResult;
use crate::money::Money;

/// Abstraction over the external payment provider's order lifecycle.
///
/// The methods are thin: they return the provider's raw JSON payloads and
/// leave interpretation (status, captured amount, idempotent-error codes)
/// to the lifecycle engine and the pure helpers in `gateway::amount` /
/// `gateway::outcome`.
#[async_trait]
pub trait PaymentGateway: Send + Sync + Clone {
    /// Create an immediate-capture order for `amount`, carrying
    /// `listing_id` as the purchase unit's reference.
    ///
    /// Returns the provider-issued order id; a response without an id is
    /// an error.
    async fn create_order(&self, listing_id: &str, amount: Money) -> PlazaResult<String>;

    /// Fetch the provider's current view of an order.
    async fn get_order(&self, order_id: &str) -> PlazaResult<serde_json::Value>;

    /// Capture an approved order.
    ///
    /// `Ok` carries the provider's success payload. A non-success provider
    /// response becomes a `Gateway` error with the provider's error body
    /// attached, so callers can recognise idempotent-success codes.
    async fn capture_order(&self, order_id: &str) -> PlazaResult<serde_json::Value>;
}
