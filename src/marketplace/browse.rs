//! In-memory browse set maintained from a store subscription.
//!
//! The browse/filter UI reads the whole collection and filters it
//! client-side; this index is that in-memory list, kept current by
//! applying [`StoreEvent`]s on top of the subscription snapshot.

use std::collections::HashMap;

use crate::marketplace::Listing;
use crate::traits::StoreEvent;

/// Materialized view of the listing collection.
#[derive(Debug, Default)]
pub struct BrowseIndex {
    listings: HashMap<String, Listing>,
}

impl BrowseIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a subscription snapshot.
    pub fn from_snapshot(snapshot: Vec<Listing>) -> Self {
        let listings = snapshot.into_iter().map(|l| (l.id.clone(), l)).collect();
        Self { listings }
    }

    /// Apply one change notification.
    pub fn apply(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::Put(listing) => {
                self.listings.insert(listing.id.clone(), listing);
            }
            StoreEvent::Removed(id) => {
                self.listings.remove(&id);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Listing> {
        self.listings.get(id)
    }

    /// The public browse set at `now_ms`: verified listings that have not
    /// passed their expiry, newest first.
    pub fn visible_at(&self, now_ms: u64) -> Vec<&Listing> {
        let mut visible: Vec<&Listing> = self
            .listings
            .values()
            .filter(|l| l.is_publicly_visible_at(now_ms))
            .collect();
        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        visible
    }
}
