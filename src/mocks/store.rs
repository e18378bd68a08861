//! In-memory mock listing store for testing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use crate::config::STORE_EVENT_CAPACITY;
use crate::error::{PlazaError, PlazaResult};
use crate::marketplace::{Listing, ListingPatch};
use crate::traits::{ListingStore, ListingSubscription, StoreEvent};

/// Types of failures that can be simulated.
#[derive(Debug, Clone)]
pub enum MockStoreFailure {
    /// Fail all operations.
    All,
    /// Fail only read operations.
    Reads,
    /// Fail only write operations.
    Writes,
    /// Fail on a specific listing id.
    OnId(String),
}

#[derive(Debug)]
struct MockStoreInner {
    listings: RwLock<HashMap<String, Listing>>,
    events: broadcast::Sender<StoreEvent>,
    fail_mode: RwLock<Option<MockStoreFailure>>,
}

/// Mock listing store for testing.
///
/// Clones share the same underlying collection, so an engine under test
/// and the test body observe identical state.
#[derive(Debug, Clone)]
pub struct MockStore {
    inner: Arc<MockStoreInner>,
}

impl MockStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(STORE_EVENT_CAPACITY);
        Self {
            inner: Arc::new(MockStoreInner {
                listings: RwLock::new(HashMap::new()),
                events,
                fail_mode: RwLock::new(None),
            }),
        }
    }

    /// Set failure mode for testing error handling.
    pub async fn set_fail_mode(&self, mode: Option<MockStoreFailure>) {
        *self.inner.fail_mode.write().await = mode;
    }

    async fn should_fail(&self, is_write: bool, id: Option<&str>) -> bool {
        let mode = self.inner.fail_mode.read().await;
        match &*mode {
            None => false,
            Some(MockStoreFailure::All) => true,
            Some(MockStoreFailure::Reads) => !is_write,
            Some(MockStoreFailure::Writes) => is_write,
            Some(MockStoreFailure::OnId(target)) => id == Some(target.as_str()),
        }
    }

    /// Number of listings currently stored.
    pub async fn listing_count(&self) -> usize {
        self.inner.listings.read().await.len()
    }

    /// Snapshot of all stored listings (for test assertions).
    pub async fn snapshot(&self) -> Vec<Listing> {
        self.inner.listings.read().await.values().cloned().collect()
    }

    fn emit(&self, event: StoreEvent) {
        // No receivers is fine; the feed is optional.
        let _ = self.inner.events.send(event);
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ListingStore for MockStore {
    async fn put(&self, listing: &Listing) -> PlazaResult<()> {
        if self.should_fail(true, Some(&listing.id)).await {
            return Err(PlazaError::Store("MockStore: simulated put failure".into()));
        }

        self.inner
            .listings
            .write()
            .await
            .insert(listing.id.clone(), listing.clone());
        self.emit(StoreEvent::Put(listing.clone()));
        Ok(())
    }

    async fn update(&self, id: &str, patch: ListingPatch) -> PlazaResult<()> {
        if self.should_fail(true, Some(id)).await {
            return Err(PlazaError::Store(
                "MockStore: simulated update failure".into(),
            ));
        }
        if patch.is_empty() {
            return Ok(());
        }

        let mut listings = self.inner.listings.write().await;
        let listing = listings
            .get_mut(id)
            .ok_or_else(|| PlazaError::NotFound(format!("listing {id}")))?;
        patch.apply(listing);
        let updated = listing.clone();
        drop(listings);

        self.emit(StoreEvent::Put(updated));
        Ok(())
    }

    async fn get(&self, id: &str) -> PlazaResult<Option<Listing>> {
        if self.should_fail(false, Some(id)).await {
            return Err(PlazaError::Store("MockStore: simulated get failure".into()));
        }

        Ok(self.inner.listings.read().await.get(id).cloned())
    }

    async fn delete(&self, id: &str) -> PlazaResult<()> {
        if self.should_fail(true, Some(id)).await {
            return Err(PlazaError::Store(
                "MockStore: simulated delete failure".into(),
            ));
        }

        let removed = self.inner.listings.write().await.remove(id);
        if removed.is_some() {
            self.emit(StoreEvent::Removed(id.to_string()));
        }
        Ok(())
    }

    async fn subscribe(&self) -> PlazaResult<ListingSubscription> {
        if self.should_fail(false, None).await {
            return Err(PlazaError::Store(
                "MockStore: simulated subscribe failure".into(),
            ));
        }

        Ok(ListingSubscription {
            snapshot: self.snapshot().await,
            events: self.inner.events.subscribe(),
        })
    }
}
