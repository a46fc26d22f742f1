//! Realtime collection synchronization.
//!
//! Every admin list and page section follows the same shape: subscribe to one
//! collection, replace the whole local list on each push, sort by `order`,
//! keep the last good list when the store reports an error, and stop when the
//! owning view goes away.
//!
//! ```no_run
//! # async fn demo() -> Result<(), atelier::StoreError> {
//! use atelier::models::Service;
//! use atelier::notify::Notifier;
//! use atelier::{CollectionSync, MemoryStore};
//!
//! let store = MemoryStore::new();
//! let services = CollectionSync::<Service>::start(&store, Notifier::silent()).await?;
//! services.ready().await;
//! println!("{} services", services.len());
//! # Ok(())
//! # }
//! ```

mod collection;

pub use collection::{decode_snapshot, CollectionSync, SubscriptionHandle, SyncStats};
