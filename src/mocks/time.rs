//! Mock time provider for testing.

use crate::traits::TimeProvider;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Mock time provider with a controllable millisecond clock.
#[derive(Debug, Clone)]
pub struct MockTime {
    current_ms: Arc<AtomicU64>,
}

impl MockTime {
    /// Create a new mock clock starting at the specified epoch-ms value.
    pub fn new(initial_ms: u64) -> Self {
        Self {
            current_ms: Arc::new(AtomicU64::new(initial_ms)),
        }
    }

    /// Create a mock clock starting at a reasonable default (2024-01-01).
    pub fn default_time() -> Self {
        Self::new(1_704_067_200_000) // 2024-01-01 00:00:00 UTC
    }

    /// Set the clock to a specific epoch-ms value.
    pub fn set(&self, timestamp_ms: u64) {
        self.current_ms.store(timestamp_ms, Ordering::SeqCst);
    }

    /// Advance the clock by the specified number of milliseconds.
    pub fn advance(&self, ms: u64) {
        self.current_ms.fetch_add(ms, Ordering::SeqCst);
    }

    /// Get the current mock clock value.
    pub fn get(&self) -> u64 {
        self.current_ms.load(Ordering::SeqCst)
    }
}

impl Default for MockTime {
    fn default() -> Self {
        Self::default_time()
    }
}

impl TimeProvider for MockTime {
    fn now_ms(&self) -> u64 {
        self.current_ms.load(Ordering::SeqCst)
    }
}
