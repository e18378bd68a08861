//! Capture outcome classification.
//!
//! Certain provider *error* responses mean the money was already taken and
//! the flow should be treated as having succeeded. The mapping from
//! provider error code to idempotent-success outcome lives here, not in
//! handler bodies.

use serde_json::Value;

use crate::money::Money;

/// Provider issue code meaning a prior capture already took the funds.
const ISSUE_ORDER_ALREADY_CAPTURED: &str = "ORDER_ALREADY_CAPTURED";

/// Provider order status meaning capture has fully settled.
pub const STATUS_COMPLETED: &str = "COMPLETED";

/// How a capture attempt resolved. All three variants are success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The explicit capture call completed the order.
    Completed { amount: Option<Money> },
    /// The gateway had already completed the order out-of-band (redirect
    /// flows); no capture call was issued.
    AlreadyCompleted { amount: Option<Money> },
    /// A prior capture raced this one; the provider refused the duplicate
    /// and the recorded amount is left untouched.
    AlreadyCaptured,
}

impl CaptureOutcome {
    /// The status label reported to API callers.
    pub const fn status_label(&self) -> &'static str {
        match self {
            Self::Completed { .. } => "COMPLETED",
            Self::AlreadyCompleted { .. } => "ALREADY_COMPLETED",
            Self::AlreadyCaptured => "ALREADY_CAPTURED",
        }
    }

    /// The captured amount, where this outcome is allowed to report one.
    pub const fn amount(&self) -> Option<Money> {
        match self {
            Self::Completed { amount } | Self::AlreadyCompleted { amount } => *amount,
            Self::AlreadyCaptured => None,
        }
    }
}

/// Whether a provider error body is the "order already captured" refusal.
///
/// The provider encodes it as an issue entry in `details`:
/// `{"name": "UNPROCESSABLE_ENTITY", "details": [{"issue": "ORDER_ALREADY_CAPTURED", ...}]}`.
pub fn is_already_captured(payload: &Value) -> bool {
    payload
        .get("details")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .any(|detail| {
            detail.get("issue").and_then(Value::as_str) == Some(ISSUE_ORDER_ALREADY_CAPTURED)
        })
}
