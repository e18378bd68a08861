//! Checkout flow state.

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Which listing mutation a successful capture performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutAction {
    /// First payment for a freshly created listing.
    CreateListing,
    /// Paid expiry extension of an existing listing.
    Extend,
}

/// The in-flight state of one checkout, from order creation to capture.
///
/// This is an explicit value object passed between transition functions,
/// never ambient UI state: it is returned by `begin_checkout` and consumed
/// by `capture`, and is discarded once the capture resolves either way.
/// Orders are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutFlow {
    pub listing_id: String,
    /// Gateway-issued order identifier.
    pub order_id: String,
    pub action: CheckoutAction,
    /// Amount the order was created over; informational after creation,
    /// the captured amount is always taken from the gateway's response.
    pub amount: Money,
}
