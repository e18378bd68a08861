//! Cancellable one-shot reconciliation sweeps, keyed by listing id.
//!
//! One sweep is armed per created order. A capture or verify that settles
//! the listing cancels the pending sweep; arming a new sweep for the same
//! listing replaces the old one. The sweep body still re-reads the listing
//! immediately before acting, so a cancellation that loses the race stays
//! harmless.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug)]
struct SweepEntry {
    generation: u64,
    token: CancellationToken,
}

/// Registry of pending sweep tasks.
#[derive(Debug, Clone, Default)]
pub struct SweepScheduler {
    tasks: Arc<Mutex<HashMap<String, SweepEntry>>>,
    next_generation: Arc<AtomicU64>,
}

impl SweepScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a sweep for `listing_id`, firing `sweep` after `delay` unless
    /// cancelled first. An existing sweep for the same listing is
    /// replaced.
    pub fn schedule<F>(&self, listing_id: &str, delay: Duration, sweep: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let token = CancellationToken::new();

        let replaced = self.tasks.lock().insert(
            listing_id.to_string(),
            SweepEntry {
                generation,
                token: token.clone(),
            },
        );
        if let Some(previous) = replaced {
            previous.token.cancel();
        }

        let tasks = self.tasks.clone();
        let id = listing_id.to_string();
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {
                    debug!("Sweep for listing {id} cancelled");
                }
                () = tokio::time::sleep(delay) => {
                    sweep.await;
                }
            }
            // Deregister, unless a newer sweep already took the slot.
            let mut map = tasks.lock();
            if map.get(&id).is_some_and(|e| e.generation == generation) {
                map.remove(&id);
            }
        });
    }

    /// Cancel the pending sweep for a listing, if any.
    pub fn cancel(&self, listing_id: &str) {
        if let Some(entry) = self.tasks.lock().remove(listing_id) {
            entry.token.cancel();
        }
    }

    /// Whether a sweep is currently armed for the listing.
    pub fn is_scheduled(&self, listing_id: &str) -> bool {
        self.tasks.lock().contains_key(listing_id)
    }

    /// Cancel every pending sweep (shutdown).
    pub fn cancel_all(&self) {
        for (_, entry) in self.tasks.lock().drain() {
            entry.token.cancel();
        }
    }
}
