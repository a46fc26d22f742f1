use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::{Document, DocumentStore, Fields, MemoryStore, StoreError, StoreEvent, Subscription};

/// A [`MemoryStore`] whose writes can be switched to fail.
#[derive(Debug, Clone, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::PermissionDenied("writes disabled".to_string()))
        } else {
            Ok(())
        }
    }
}

impl DocumentStore for FlakyStore {
    async fn subscribe(&self, collection: &str) -> Result<Subscription, StoreError> {
        self.inner.subscribe(collection).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.inner.list(collection).await
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        self.check()?;
        self.inner.add(collection, fields).await
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.check()?;
        self.inner.set(collection, id, fields).await
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.check()?;
        self.inner.update(collection, id, fields).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.check()?;
        self.inner.delete(collection, id).await
    }
}

/// A [`MemoryStore`] whose subscriptions report one error and then end
/// without ever delivering a snapshot.
#[derive(Debug, Clone, Default)]
pub struct ClosingStore {
    pub inner: MemoryStore,
}

impl ClosingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for ClosingStore {
    async fn subscribe(&self, _collection: &str) -> Result<Subscription, StoreError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(StoreEvent::Error("socket closed".to_string()));
        Ok(Subscription::new(rx))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.inner.list(collection).await
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        self.inner.add(collection, fields).await
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.inner.set(collection, id, fields).await
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.inner.update(collection, id, fields).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.inner.delete(collection, id).await
    }
}
