//! Listing store abstraction for testable persistence.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::PlazaResult;
use crate::marketplace::{Listing, ListingPatch};

/// A change notification from the listing collection.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// A listing was created or overwritten (also emitted for partial
    /// updates, carrying the merged record).
    Put(Listing),
    /// A listing was removed, identified by id.
    Removed(String),
}

/// Snapshot plus live change feed, as returned by [`ListingStore::subscribe`].
///
/// The snapshot is the collection state at subscription time; `events`
/// delivers every mutation after that point. Receivers that fall behind see
/// `RecvError::Lagged` and should resubscribe.
pub struct ListingSubscription {
    pub snapshot: Vec<Listing>,
    pub events: broadcast::Receiver<StoreEvent>,
}

/// Abstraction over listing persistence.
///
/// All lifecycle transitions touch exactly one listing per operation; no
/// cross-listing transactions are required or offered.
#[async_trait]
pub trait ListingStore: Send + Sync + Clone {
    /// Create or overwrite a listing by id.
    async fn put(&self, listing: &Listing) -> PlazaResult<()>;

    /// Partially update a listing's lifecycle fields by id.
    ///
    /// Fails with `NotFound` if no listing exists under the id.
    async fn update(&self, id: &str, patch: ListingPatch) -> PlazaResult<()>;

    /// Read a listing by id. `None` if absent.
    async fn get(&self, id: &str) -> PlazaResult<Option<Listing>>;

    /// Delete a listing by id. Deleting an absent id is not an error.
    async fn delete(&self, id: &str) -> PlazaResult<()>;

    /// Subscribe to the listing collection.
    async fn subscribe(&self) -> PlazaResult<ListingSubscription>;
}
