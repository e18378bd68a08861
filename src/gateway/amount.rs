//! Captured-amount extraction from gateway order payloads.
//!
//! The provider reports the money taken in more than one place depending
//! on which call produced the payload. Extraction tries an explicit
//! ordered list of strategies, most specific first:
//!
//! 1. capture-level amount (`purchase_units[].payments.captures[].amount.value`)
//! 2. purchase-unit amount (`purchase_units[].amount.value`)
//!
//! Ambiguity never fails a transition; callers treat `None` as zero.

use serde_json::Value;

use crate::money::Money;

/// The provider's top-level order status, when present.
pub fn order_status(payload: &Value) -> Option<&str> {
    payload.get("status").and_then(Value::as_str)
}

/// Extract the captured amount from an order or capture payload.
pub fn captured_amount(payload: &Value) -> Option<Money> {
    capture_level_amount(payload).or_else(|| unit_level_amount(payload))
}

fn purchase_units(payload: &Value) -> impl Iterator<Item = &Value> {
    payload
        .get("purchase_units")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn capture_level_amount(payload: &Value) -> Option<Money> {
    purchase_units(payload)
        .filter_map(|unit| {
            unit.get("payments")
                .and_then(|p| p.get("captures"))
                .and_then(Value::as_array)
        })
        .flatten()
        .find_map(amount_value)
}

fn unit_level_amount(payload: &Value) -> Option<Money> {
    purchase_units(payload).find_map(amount_value)
}

fn amount_value(node: &Value) -> Option<Money> {
    let value = node
        .get("amount")
        .and_then(|a| a.get("value"))
        .and_then(Value::as_str)?;
    Money::parse_decimal(value).ok()
}
