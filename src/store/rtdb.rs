//! Hosted realtime-database REST/SSE store.
//!
//! Listing records live under a `listings/` node; every operation is a
//! plain REST call on `{base}/listings/{id}.json`, and the subscription
//! feed is the database's `text/event-stream` endpoint for the collection
//! node.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::config::{HTTP_TIMEOUT_SECS, STORE_EVENT_CAPACITY};
use crate::error::{PlazaError, PlazaResult};
use crate::marketplace::{Listing, ListingPatch};
use crate::store::sse::{SseFrame, SseParser};
use crate::traits::{ListingStore, ListingSubscription, StoreEvent};

/// REST client for the hosted realtime database.
#[derive(Debug, Clone)]
pub struct RtdbStore {
    /// Client for one-shot CRUD calls, bounded by the request timeout.
    http: reqwest::Client,
    /// Client for the long-lived event stream; a total-request timeout
    /// would sever the stream, so this one only bounds connect time.
    stream_http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl RtdbStore {
    pub fn new(base_url: String, auth_token: Option<String>) -> PlazaResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| PlazaError::Store(format!("failed to build HTTP client: {e}")))?;
        let stream_http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| PlazaError::Store(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            stream_http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
        })
    }

    fn node_url(&self, node: &str) -> String {
        let mut url = format!("{}/{node}.json", self.base_url);
        if let Some(token) = &self.auth_token {
            url.push_str("?auth=");
            url.push_str(token);
        }
        url
    }

    fn listing_url(&self, id: &str) -> String {
        self.node_url(&format!("listings/{id}"))
    }

    fn collection_url(&self) -> String {
        self.node_url("listings")
    }

    async fn ensure_success(resp: reqwest::Response, op: &str) -> PlazaResult<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            Err(PlazaError::Store(format!("{op} failed: HTTP {status}")))
        }
    }

    /// Read the whole collection (subscription snapshot).
    async fn fetch_all(&self) -> PlazaResult<Vec<Listing>> {
        let resp = self
            .http
            .get(self.collection_url())
            .send()
            .await
            .map_err(|e| PlazaError::Store(format!("collection read failed: {e}")))?;
        let resp = Self::ensure_success(resp, "collection read").await?;

        let body: Value = resp
            .json()
            .await
            .map_err(|e| PlazaError::Store(format!("collection read returned bad JSON: {e}")))?;

        Ok(collection_listings(&body))
    }

    /// Drive the event stream, forwarding store events until the stream
    /// ends or every receiver is gone.
    async fn run_stream(self, tx: broadcast::Sender<StoreEvent>) {
        let mut resp = match self
            .stream_http
            .get(self.collection_url())
            .header("Accept", "text/event-stream")
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                warn!("Listing stream rejected: HTTP {}", resp.status());
                return;
            }
            Err(e) => {
                warn!("Listing stream connect failed: {e}");
                return;
            }
        };

        let mut parser = SseParser::new();
        loop {
            match resp.chunk().await {
                Ok(Some(chunk)) => {
                    for frame in parser.push(&chunk) {
                        for event in self.frame_events(&frame).await {
                            if tx.send(event).is_err() {
                                debug!("All listing subscribers gone, stopping stream");
                                return;
                            }
                        }
                    }
                }
                Ok(None) => {
                    debug!("Listing stream ended");
                    return;
                }
                Err(e) => {
                    warn!("Listing stream read failed: {e}");
                    return;
                }
            }
        }
    }

    /// Translate one stream frame into store events.
    async fn frame_events(&self, frame: &SseFrame) -> Vec<StoreEvent> {
        let Some((path, data)) = parse_stream_frame(frame) else {
            return Vec::new();
        };

        match path_child(&path) {
            // Root writes re-state the whole collection.
            None => collection_listings(&data)
                .into_iter()
                .map(StoreEvent::Put)
                .collect(),
            Some(id) => match frame.event.as_str() {
                "put" if data.is_null() => vec![StoreEvent::Removed(id.to_string())],
                "put" => match serde_json::from_value::<Listing>(data) {
                    Ok(listing) => vec![StoreEvent::Put(listing)],
                    Err(e) => {
                        warn!("Skipping unparsable listing record at {path}: {e}");
                        Vec::new()
                    }
                },
                // Partial writes (and deep-path puts) carry only a field
                // subset; re-read the record to emit the merged state.
                _ => match self.get(id).await {
                    Ok(Some(listing)) => vec![StoreEvent::Put(listing)],
                    Ok(None) => vec![StoreEvent::Removed(id.to_string())],
                    Err(e) => {
                        warn!("Failed to re-read {id} after stream patch: {e}");
                        Vec::new()
                    }
                },
            },
        }
    }
}

/// Decode a stream frame's `{"path": ..., "data": ...}` envelope.
/// Non-change frames (keep-alives, auth notices) decode to `None`.
fn parse_stream_frame(frame: &SseFrame) -> Option<(String, Value)> {
    if frame.event != "put" && frame.event != "patch" {
        return None;
    }
    let envelope: Value = serde_json::from_str(&frame.data).ok()?;
    let path = envelope.get("path")?.as_str()?.to_string();
    let data = envelope.get("data")?.clone();
    Some((path, data))
}

/// The first path segment under the collection node, or `None` for the
/// collection root itself.
fn path_child(path: &str) -> Option<&str> {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.split('/').next().unwrap_or(trimmed))
}

/// Parse a collection-node value into listing records, skipping entries
/// that do not parse (foreign or partial writes).
fn collection_listings(body: &Value) -> Vec<Listing> {
    let Some(map) = body.as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter_map(|(id, record)| match serde_json::from_value(record.clone()) {
            Ok(listing) => Some(listing),
            Err(e) => {
                warn!("Skipping unparsable listing record {id}: {e}");
                None
            }
        })
        .collect()
}

#[async_trait]
impl ListingStore for RtdbStore {
    async fn put(&self, listing: &Listing) -> PlazaResult<()> {
        let resp = self
            .http
            .put(self.listing_url(&listing.id))
            .json(listing)
            .send()
            .await
            .map_err(|e| PlazaError::Store(format!("put failed: {e}")))?;
        Self::ensure_success(resp, "put").await?;
        Ok(())
    }

    async fn update(&self, id: &str, patch: ListingPatch) -> PlazaResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        // A PATCH against an absent node would create a partial record;
        // check existence first to keep update-means-update semantics.
        if self.get(id).await?.is_none() {
            return Err(PlazaError::NotFound(format!("listing {id}")));
        }

        let resp = self
            .http
            .patch(self.listing_url(id))
            .json(&patch)
            .send()
            .await
            .map_err(|e| PlazaError::Store(format!("update failed: {e}")))?;
        Self::ensure_success(resp, "update").await?;
        Ok(())
    }

    async fn get(&self, id: &str) -> PlazaResult<Option<Listing>> {
        let resp = self
            .http
            .get(self.listing_url(id))
            .send()
            .await
            .map_err(|e| PlazaError::Store(format!("get failed: {e}")))?;
        let resp = Self::ensure_success(resp, "get").await?;

        let body: Value = resp
            .json()
            .await
            .map_err(|e| PlazaError::Store(format!("get returned bad JSON: {e}")))?;

        if body.is_null() {
            return Ok(None);
        }
        serde_json::from_value(body)
            .map(Some)
            .map_err(|e| PlazaError::Store(format!("listing {id} failed to parse: {e}")))
    }

    async fn delete(&self, id: &str) -> PlazaResult<()> {
        let resp = self
            .http
            .delete(self.listing_url(id))
            .send()
            .await
            .map_err(|e| PlazaError::Store(format!("delete failed: {e}")))?;
        Self::ensure_success(resp, "delete").await?;
        Ok(())
    }

    async fn subscribe(&self) -> PlazaResult<ListingSubscription> {
        let snapshot = self.fetch_all().await?;
        let (tx, rx) = broadcast::channel(STORE_EVENT_CAPACITY);
        tokio::spawn(self.clone().run_stream(tx));
        Ok(ListingSubscription {
            snapshot,
            events: rx,
        })
    }
}
