//! Time provider abstraction for testable time-dependent code.

use std::time::{SystemTime, UNIX_EPOCH};

/// Trait for providing the current time as epoch milliseconds.
///
/// Listing timestamps (`createdAt`, `expiresAt`) are epoch milliseconds, so
/// everything downstream of this trait works in the same unit. The
/// abstraction lets expiry arithmetic be tested with deterministic,
/// controllable clock values.
pub trait TimeProvider: Send + Sync {
    /// Returns the current epoch timestamp in milliseconds.
    fn now_ms(&self) -> u64;
}

/// Production implementation that uses the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

impl SystemTimeProvider {
    pub const fn new() -> Self {
        Self
    }
}
