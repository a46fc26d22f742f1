//! Document store seam.
//!
//! The site talks to its database only through [`DocumentStore`]: per
//! collection realtime subscriptions plus document-level writes. Three
//! implementations ship with the crate:
//!
//! - [`MemoryStore`]: in-process, optionally persisted through [`disk`]
//! - [`RemoteStore`]: HTTP writes and WebSocket pushes against `atelier-server`
//!
//! # Push semantics
//!
//! A subscription yields [`StoreEvent::Snapshot`] with the complete
//! collection, first immediately and then after every change. There are no
//! incremental patches. A [`StoreEvent::Error`] reports a transient failure;
//! the subscription stays open.

pub mod disk;
pub mod memory;
pub mod remote;
pub mod wire;

#[cfg(test)]
pub(crate) mod testing;

pub use memory::MemoryStore;
pub use remote::{check_server, RemoteStore};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Field map of one document, without its id.
pub type Fields = serde_json::Map<String, Value>;

/// A stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Decodes the document into a record, with the id merged into the fields.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let mut map = self.fields.clone();
        map.insert("id".to_string(), Value::String(self.id.clone()));
        serde_json::from_value(Value::Object(map))
    }

    /// Numeric `order` field, if the document has one.
    pub fn order(&self) -> Option<f64> {
        self.fields.get("order").and_then(Value::as_f64)
    }
}

/// Serializes a record into a field map, dropping its `id`.
pub fn encode_fields<T: Serialize>(value: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(value).map_err(|e| StoreError::Encode(e.to_string()))? {
        Value::Object(mut map) => {
            map.remove("id");
            Ok(map)
        }
        other => Err(StoreError::Encode(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

/// Something pushed to a subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// The whole collection as it is now.
    Snapshot(Vec<Document>),
    /// The store could not deliver an update.
    Error(String),
}

/// A live subscription to one collection.
///
/// Dropping it releases the listener: the store notices the closed channel,
/// and any background task feeding it is aborted.
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<StoreEvent>,
    feeder: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(receiver: mpsc::UnboundedReceiver<StoreEvent>) -> Self {
        Self {
            receiver,
            feeder: None,
        }
    }

    /// A subscription fed by a background task, aborted on drop.
    pub fn with_feeder(receiver: mpsc::UnboundedReceiver<StoreEvent>, feeder: JoinHandle<()>) -> Self {
        Self {
            receiver,
            feeder: Some(feeder),
        }
    }

    /// Next event, or `None` once the store side has gone away.
    pub async fn next(&mut self) -> Option<StoreEvent> {
        self.receiver.recv().await
    }

    /// Next event if one is already queued.
    pub fn try_next(&mut self) -> Option<StoreEvent> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(feeder) = self.feeder.take() {
            feeder.abort();
        }
    }
}

/// Errors surfaced by store implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store not configured")]
    NotConfigured,
    #[error("Invalid collection name: {0}")]
    InvalidCollection(String),
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Server error: {0}")]
    Server(String),
    #[error("Encoding error: {0}")]
    Encode(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

/// The contract of the managed document database.
///
/// Writes are scoped to a single document. `set` replaces the whole field map
/// (creating the document if needed), `update` merges into an existing one.
pub trait DocumentStore: Clone + Send + Sync + 'static {
    fn subscribe(
        &self,
        collection: &str,
    ) -> impl Future<Output = Result<Subscription, StoreError>> + Send;

    fn list(&self, collection: &str)
        -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Creates a document with a store-assigned id and returns that id.
    fn add(
        &self,
        collection: &str,
        fields: Fields,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Deleting a missing document is not an error.
    fn delete(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Validates a collection name to keep it usable as a file stem and URL
/// segment.
pub fn validate_collection(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && !name.starts_with('-')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidCollection(name.to_string()))
    }
}

/// Orders documents by their `order` field, stably.
///
/// Documents without an order keep their relative position after all ordered
/// ones. A snapshot with no ordered documents is left in natural order.
pub fn sort_by_order(documents: &mut [Document]) {
    if documents.iter().all(|d| d.order().is_none()) {
        return;
    }
    documents.sort_by(|a, b| match (a.order(), b.order()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Builds a field map from `(key, value)` pairs.
#[macro_export]
macro_rules! fields {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut map = $crate::store::Fields::new();
        $(map.insert(($key).to_string(), ::serde_json::json!($value));)*
        map
    }};
}
