//! In-process document store with realtime fan-out.
//!
//! Collections live in memory in insertion order. Every mutation publishes a
//! fresh snapshot to all subscribers of the touched collection while the
//! write lock is still held, so subscribers observe changes in commit order.
//! When opened on a data directory, each collection is written through to
//! disk before the change becomes visible.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::disk::DiskStorage;
use super::{validate_collection, Document, DocumentStore, Fields, StoreError, StoreEvent, Subscription};

/// Tracks subscribers per collection.
#[derive(Debug, Default)]
pub struct SubscriptionHub {
    listeners: Mutex<HashMap<String, Vec<mpsc::UnboundedSender<StoreEvent>>>>,
}

impl SubscriptionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener and queues `initial` as its first event.
    pub fn subscribe(
        &self,
        collection: &str,
        initial: StoreEvent,
    ) -> mpsc::UnboundedReceiver<StoreEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        // Receiver is alive, this cannot fail
        let _ = tx.send(initial);

        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.entry(collection.to_string()).or_default().push(tx);
        rx
    }

    /// Sends `event` to every live listener of `collection`, dropping the ones
    /// that went away.
    pub fn publish(&self, collection: &str, event: StoreEvent) {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(senders) = listeners.get_mut(collection) {
            senders.retain(|tx| tx.send(event.clone()).is_ok());
            if senders.is_empty() {
                listeners.remove(collection);
            }
        }
    }

    /// Number of live listeners on `collection`.
    pub fn listener_count(&self, collection: &str) -> usize {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);

        match listeners.get_mut(collection) {
            Some(senders) => {
                senders.retain(|tx| !tx.is_closed());
                senders.len()
            }
            None => 0,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    hub: SubscriptionHub,
    disk: Option<DiskStorage>,
}

/// Shared handle to an in-memory store. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Creates an empty, purely in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a store persisted under `data_dir`, loading existing collections.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let disk = DiskStorage::new(data_dir);
        let collections = disk.load_all()?;

        tracing::info!(
            "Loaded {} collection(s) from {}",
            collections.len(),
            disk.data_dir().display()
        );

        Ok(Self {
            inner: Arc::new(Inner {
                collections: RwLock::new(collections),
                hub: SubscriptionHub::new(),
                disk: Some(disk),
            }),
        })
    }

    /// Current documents of `collection` in natural order.
    pub fn snapshot(&self, collection: &str) -> Vec<Document> {
        let collections = self
            .inner
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        collections.get(collection).cloned().unwrap_or_default()
    }

    /// Looks up one document.
    pub fn get(&self, collection: &str, id: &str) -> Option<Document> {
        let collections = self
            .inner
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id).cloned())
    }

    /// Number of live subscribers on `collection`.
    pub fn listener_count(&self, collection: &str) -> usize {
        self.inner.hub.listener_count(collection)
    }

    /// Pushes an error event to every subscriber of `collection`.
    pub fn publish_error(&self, collection: &str, message: impl Into<String>) {
        self.inner
            .hub
            .publish(collection, StoreEvent::Error(message.into()));
    }

    fn open_subscription(&self, collection: &str) -> Result<Subscription, StoreError> {
        validate_collection(collection)?;

        // Holding the read lock keeps writers from slipping a change in
        // between the initial snapshot and the registration.
        let collections = self
            .inner
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let initial = collections.get(collection).cloned().unwrap_or_default();
        let rx = self
            .inner
            .hub
            .subscribe(collection, StoreEvent::Snapshot(initial));

        tracing::debug!("New subscriber on {}", collection);
        Ok(Subscription::new(rx))
    }

    /// Applies `change` to a copy of the collection, persists it, then commits
    /// and publishes.
    fn mutate<R>(
        &self,
        collection: &str,
        change: impl FnOnce(&mut Vec<Document>) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        validate_collection(collection)?;

        let mut collections = self
            .inner
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let mut docs = collections.get(collection).cloned().unwrap_or_default();
        let result = change(&mut docs)?;

        if let Some(disk) = &self.inner.disk {
            if let Err(e) = disk.save(collection, &docs) {
                let err = StoreError::from(e);
                self.inner
                    .hub
                    .publish(collection, StoreEvent::Error(err.to_string()));
                return Err(err);
            }
        }

        collections.insert(collection.to_string(), docs.clone());
        self.inner
            .hub
            .publish(collection, StoreEvent::Snapshot(docs));

        Ok(result)
    }

    fn insert_new(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        let doc_id = id.clone();
        self.mutate(collection, move |docs| {
            docs.push(Document::new(doc_id, fields));
            Ok(())
        })?;
        tracing::debug!("Added {}/{}", collection, id);
        Ok(id)
    }

    fn replace(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.mutate(collection, |docs| {
            match docs.iter().position(|d| d.id == id) {
                Some(index) => docs[index].fields = fields,
                None => docs.push(Document::new(id, fields)),
            }
            Ok(())
        })
    }

    fn merge(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.mutate(collection, |docs| {
            let doc = docs
                .iter_mut()
                .find(|d| d.id == id)
                .ok_or_else(|| StoreError::NotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                })?;
            for (key, value) in fields {
                doc.fields.insert(key, value);
            }
            Ok(())
        })
    }

    fn remove(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.mutate(collection, |docs| {
            docs.retain(|d| d.id != id);
            Ok(())
        })
    }
}

impl DocumentStore for MemoryStore {
    async fn subscribe(&self, collection: &str) -> Result<Subscription, StoreError> {
        self.open_subscription(collection)
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        validate_collection(collection)?;
        Ok(self.snapshot(collection))
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        self.insert_new(collection, fields)
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.replace(collection, id, fields)
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.merge(collection, id, fields)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.remove(collection, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;
    use tempfile::TempDir;

    fn snapshot_ids(event: Option<StoreEvent>) -> Vec<String> {
        match event {
            Some(StoreEvent::Snapshot(docs)) => docs.into_iter().map(|d| d.id).collect(),
            other => panic!("expected snapshot, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_subscribe_gets_initial_snapshot() {
        let store = MemoryStore::new();
        store
            .set("content", "hero-title", fields! { "content" => "Hi" })
            .await
            .unwrap();

        let mut sub = store.subscribe("content").await.unwrap();
        assert_eq!(snapshot_ids(sub.try_next()), ["hero-title"]);
    }

    #[tokio::test]
    async fn test_every_write_pushes_full_snapshot() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe("categories").await.unwrap();
        assert!(snapshot_ids(sub.try_next()).is_empty());

        let a = store.add("categories", fields! { "name" => "A" }).await.unwrap();
        let b = store.add("categories", fields! { "name" => "B" }).await.unwrap();
        assert_eq!(snapshot_ids(sub.try_next()), [a.clone()]);
        assert_eq!(snapshot_ids(sub.try_next()), [a.clone(), b.clone()]);

        store.delete("categories", &a).await.unwrap();
        assert_eq!(snapshot_ids(sub.try_next()), [b]);
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let store = MemoryStore::new();
        let mut gallery = store.subscribe("gallery").await.unwrap();
        gallery.try_next();

        store.add("services", fields! { "title" => "X" }).await.unwrap();
        assert!(gallery.try_next().is_none());
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemoryStore::new();
        let id = store
            .add("services", fields! { "title" => "Old", "icon" => "Gem" })
            .await
            .unwrap();

        store
            .update("services", &id, fields! { "title" => "New" })
            .await
            .unwrap();

        let doc = store.get("services", &id).unwrap();
        assert_eq!(doc.fields["title"], "New");
        assert_eq!(doc.fields["icon"], "Gem");
    }

    #[tokio::test]
    async fn test_update_missing_document_fails() {
        let store = MemoryStore::new();
        let err = store
            .update("services", "nope", fields! { "title" => "x" })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_set_replaces_fields() {
        let store = MemoryStore::new();
        store
            .set("content", "a", fields! { "content" => "1", "type" => "text" })
            .await
            .unwrap();
        store
            .set("content", "a", fields! { "content" => "2" })
            .await
            .unwrap();

        let doc = store.get("content", "a").unwrap();
        assert_eq!(doc.fields["content"], "2");
        assert!(!doc.fields.contains_key("type"));
    }

    #[tokio::test]
    async fn test_dropped_subscription_is_released() {
        let store = MemoryStore::new();
        let sub = store.subscribe("gallery").await.unwrap();
        assert_eq!(store.listener_count("gallery"), 1);

        drop(sub);
        assert_eq!(store.listener_count("gallery"), 0);
    }

    #[tokio::test]
    async fn test_publish_error_reaches_subscribers() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe("gallery").await.unwrap();
        sub.try_next();

        store.publish_error("gallery", "permission denied");
        assert_eq!(
            sub.try_next(),
            Some(StoreEvent::Error("permission denied".to_string()))
        );
    }

    #[tokio::test]
    async fn test_invalid_collection_rejected() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.add("../x", Fields::new()).await,
            Err(StoreError::InvalidCollection(_))
        ));
        assert!(store.subscribe("").await.is_err());
    }

    #[tokio::test]
    async fn test_open_persists_across_instances() {
        let temp = TempDir::new().unwrap();

        let id = {
            let store = MemoryStore::open(temp.path()).unwrap();
            store
                .add("gallery", fields! { "title" => "Oak chest", "order" => 0 })
                .await
                .unwrap()
        };

        let reopened = MemoryStore::open(temp.path()).unwrap();
        let doc = reopened.get("gallery", &id).unwrap();
        assert_eq!(doc.fields["title"], "Oak chest");
    }
}
