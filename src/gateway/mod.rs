//! Payment provider integration: the HTTP client plus the pure payload
//! interpretation helpers the lifecycle engine relies on.

pub mod amount;
pub mod outcome;
pub mod paypal;

pub use outcome::CaptureOutcome;
pub use paypal::PayPalClient;
