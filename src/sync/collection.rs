use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::models::Record;
use crate::notify::Notifier;
use crate::store::{sort_by_order, Document, DocumentStore, StoreError, StoreEvent, Subscription};

/// Owns the task pumping one subscription. Dropping it stops the pump and
/// releases the store-side listener.
#[derive(Debug)]
pub struct SubscriptionHandle {
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    pub fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Counters kept for diagnostics.
#[derive(Debug, Default)]
pub struct SyncStats {
    snapshots: AtomicUsize,
    errors: AtomicUsize,
    last_error: Mutex<Option<String>>,
}

impl SyncStats {
    pub fn snapshots(&self) -> usize {
        self.snapshots.load(Ordering::SeqCst)
    }

    pub fn errors(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record_snapshot(&self) {
        self.snapshots.fetch_add(1, Ordering::SeqCst);
    }

    fn record_error(&self, message: &str) {
        *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = Some(message.to_string());
        self.errors.fetch_add(1, Ordering::SeqCst);
    }
}

/// Decodes a snapshot into records, sorted by `order`.
///
/// Documents that do not decode are logged and skipped.
pub fn decode_snapshot<T: Record>(collection: &str, mut documents: Vec<Document>) -> Vec<T> {
    sort_by_order(&mut documents);
    documents
        .iter()
        .filter_map(|doc| match doc.decode::<T>() {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping {}/{}: {}", collection, doc.id, e);
                None
            }
        })
        .collect()
}

/// A live, sorted list mirroring one collection.
#[derive(Debug)]
pub struct CollectionSync<T> {
    collection: String,
    items: watch::Receiver<Vec<T>>,
    loaded: watch::Receiver<bool>,
    stats: Arc<SyncStats>,
    _handle: SubscriptionHandle,
}

impl<T: Record> CollectionSync<T> {
    /// Subscribes to the record type's own collection.
    pub async fn start<S: DocumentStore>(store: &S, notifier: Notifier) -> Result<Self, StoreError> {
        Self::start_collection(store, T::COLLECTION, notifier).await
    }

    pub async fn start_collection<S: DocumentStore>(
        store: &S,
        collection: &str,
        notifier: Notifier,
    ) -> Result<Self, StoreError> {
        let subscription = store.subscribe(collection).await?;
        Ok(Self::attach(subscription, collection, notifier))
    }

    /// Starts pumping an already open subscription.
    pub fn attach(subscription: Subscription, collection: &str, notifier: Notifier) -> Self {
        let (items_tx, items) = watch::channel(Vec::new());
        let (loaded_tx, loaded) = watch::channel(false);
        let stats = Arc::new(SyncStats::default());

        let task = tokio::spawn(pump::<T>(
            subscription,
            collection.to_string(),
            items_tx,
            loaded_tx,
            Arc::clone(&stats),
            notifier,
        ));

        Self {
            collection: collection.to_string(),
            items,
            loaded,
            stats,
            _handle: SubscriptionHandle::new(task),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// The current list.
    pub fn items(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn find(&self, id: &str) -> Option<T> {
        self.items.borrow().iter().find(|r| r.id() == id).cloned()
    }

    /// A receiver that views can await for list changes.
    pub fn watch(&self) -> watch::Receiver<Vec<T>> {
        self.items.clone()
    }

    /// Waits for the next list replacement. Returns false once the pump ended.
    pub async fn changed(&mut self) -> bool {
        self.items.changed().await.is_ok()
    }

    /// True once the first snapshot or error arrived, or the subscription
    /// ended.
    pub fn is_loaded(&self) -> bool {
        *self.loaded.borrow()
    }

    /// Waits until loading is over, successfully or not.
    pub async fn ready(&self) {
        let mut loaded = self.loaded.clone();
        let _ = loaded.wait_for(|loaded| *loaded).await;
    }

    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    pub fn snapshots_received(&self) -> usize {
        self.stats.snapshots()
    }

    pub fn errors_reported(&self) -> usize {
        self.stats.errors()
    }
}

async fn pump<T: Record>(
    mut subscription: Subscription,
    collection: String,
    items: watch::Sender<Vec<T>>,
    loaded: watch::Sender<bool>,
    stats: Arc<SyncStats>,
    notifier: Notifier,
) {
    while let Some(event) = subscription.next().await {
        match event {
            StoreEvent::Snapshot(documents) => {
                let list = decode_snapshot::<T>(&collection, documents);
                tracing::debug!("{}: {} record(s)", collection, list.len());
                stats.record_snapshot();
                items.send_replace(list);
                loaded.send_replace(true);
            }
            StoreEvent::Error(message) => {
                stats.record_error(&message);
                notifier.error(format!("Could not load {}", collection), message);
                loaded.send_replace(true);
            }
        }
    }
    tracing::debug!("Subscription to {} ended", collection);
    loaded.send_replace(true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;
    use crate::models::{Category, GalleryItem};
    use crate::notify::{drain, Level};
    use crate::store::testing::ClosingStore;
    use crate::store::MemoryStore;
    use std::time::Duration;

    async fn eventually(mut check: impl FnMut() -> bool) {
        for _ in 0..200 {
            if check() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached");
    }

    #[tokio::test]
    async fn test_empty_then_item() {
        let store = MemoryStore::new();
        let sync = CollectionSync::<Category>::start(&store, Notifier::silent())
            .await
            .unwrap();
        sync.ready().await;
        assert!(sync.is_empty());

        let mut list = sync.watch();
        list.borrow_and_update();

        store
            .add("categories", fields! { "name" => "Chairs", "slug" => "chairs" })
            .await
            .unwrap();

        assert!(list.changed().await.is_ok());
        let items = sync.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].slug, "chairs");
    }

    #[tokio::test]
    async fn test_error_keeps_last_good_list() {
        let store = MemoryStore::new();
        store
            .add("categories", fields! { "name" => "Chairs", "slug" => "chairs" })
            .await
            .unwrap();
        let (notifier, mut rx) = Notifier::channel();
        let sync = CollectionSync::<Category>::start(&store, notifier).await.unwrap();
        sync.ready().await;

        store.publish_error("categories", "permission denied");
        eventually(|| sync.errors_reported() == 1).await;

        assert_eq!(sync.len(), 1);
        assert_eq!(sync.stats().last_error().as_deref(), Some("permission denied"));
        let notices = drain(&mut rx);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, Level::Error);
    }

    #[tokio::test]
    async fn test_error_then_close_ends_loading() {
        let (notifier, mut rx) = Notifier::channel();
        let sync = CollectionSync::<Category>::start(&ClosingStore::new(), notifier)
            .await
            .unwrap();

        tokio::time::timeout(Duration::from_secs(1), sync.ready())
            .await
            .expect("ready should resolve after the subscription ends");
        assert!(sync.is_loaded());
        assert!(sync.is_empty());
        assert_eq!(sync.errors_reported(), 1);
        assert_eq!(drain(&mut rx)[0].level, Level::Error);
    }

    #[tokio::test]
    async fn test_sorted_by_order() {
        let store = MemoryStore::new();
        for (title, order) in [("c", 2), ("a", 0), ("b", 1)] {
            store
                .add("gallery", fields! { "title" => title, "order" => order })
                .await
                .unwrap();
        }

        let sync = CollectionSync::<GalleryItem>::start(&store, Notifier::silent())
            .await
            .unwrap();
        sync.ready().await;

        let titles: Vec<_> = sync.items().into_iter().map(|g| g.title).collect();
        assert_eq!(titles, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_undecodable_documents_are_skipped() {
        let store = MemoryStore::new();
        store
            .add("categories", fields! { "name" => "Ok", "slug" => "ok" })
            .await
            .unwrap();
        store
            .add("categories", fields! { "slug" => "nameless" })
            .await
            .unwrap();

        let sync = CollectionSync::<Category>::start(&store, Notifier::silent())
            .await
            .unwrap();
        sync.ready().await;

        assert_eq!(sync.len(), 1);
        assert_eq!(sync.snapshots_received(), 1);
    }

    #[tokio::test]
    async fn test_drop_releases_listener() {
        let store = MemoryStore::new();
        let sync = CollectionSync::<Category>::start(&store, Notifier::silent())
            .await
            .unwrap();
        sync.ready().await;
        assert_eq!(store.listener_count("categories"), 1);

        drop(sync);
        eventually(|| store.listener_count("categories") == 0).await;
    }

    #[test]
    fn test_decode_snapshot_orders_before_decoding() {
        let docs = vec![
            Document::new("2", fields! { "name" => "B", "slug" => "b", "order" => 1 }),
            Document::new("1", fields! { "name" => "A", "slug" => "a", "order" => 0 }),
        ];
        let categories: Vec<Category> = decode_snapshot("categories", docs);
        assert_eq!(categories[0].id, "1");
    }
}
