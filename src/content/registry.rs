use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::watch;

use crate::models::{collections, ContentEntry, ContentKind};
use crate::notify::Notifier;
use crate::store::{encode_fields, DocumentStore, StoreError, StoreEvent, Subscription};
use crate::sync::{decode_snapshot, SubscriptionHandle};

/// How the registry relates to its store. Informational only; edits are
/// never blocked on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No store configured; defaults and local edits only.
    NotConfigured,
    /// Waiting for the first snapshot.
    Connecting,
    Connected,
    /// The last subscription push or write failed.
    Degraded,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::NotConfigured => write!(f, "not configured"),
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::Degraded => write!(f, "degraded"),
        }
    }
}

/// The edit was applied locally but did not reach the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Saved locally, but '{id}' was not written to the store: {error}")]
pub struct RemoteWriteWarning {
    pub id: String,
    pub error: StoreError,
}

#[derive(Debug, Default)]
struct Entries {
    /// Last snapshot from the store.
    remote: HashMap<String, ContentEntry>,
    /// Local edits not yet confirmed by a newer store value.
    local: HashMap<String, ContentEntry>,
}

impl Entries {
    fn lookup(&self, id: &str) -> Option<&ContentEntry> {
        self.local.get(id).or_else(|| self.remote.get(id))
    }

    /// Replaces the remote view and drops local edits the store has caught
    /// up with.
    fn apply_snapshot(&mut self, entries: Vec<ContentEntry>) {
        self.remote = entries.into_iter().map(|e| (e.id.clone(), e)).collect();

        let remote = &self.remote;
        self.local.retain(|id, edit| match remote.get(id) {
            Some(entry) => !is_at_least(entry.updated_at, edit.updated_at),
            None => true,
        });
    }
}

fn is_at_least(remote: Option<DateTime<Utc>>, local: Option<DateTime<Utc>>) -> bool {
    match (remote, local) {
        (Some(remote), Some(local)) => remote >= local,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

#[derive(Debug)]
struct Shared {
    entries: RwLock<Entries>,
    status: watch::Sender<ConnectionStatus>,
    loaded: watch::Sender<bool>,
}

impl Shared {
    fn new(status: ConnectionStatus, loaded: bool) -> Arc<Self> {
        Arc::new(Self {
            entries: RwLock::new(Entries::default()),
            status: watch::channel(status).0,
            loaded: watch::channel(loaded).0,
        })
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Key to string mapping for every editable slot on the page.
///
/// Reads never fail: an unknown slot resolves to the caller's default, also
/// while the first snapshot is still in flight. Writes are local first; the
/// store write is attempted afterwards and its failure only produces a
/// [`RemoteWriteWarning`].
#[derive(Debug)]
pub struct ContentRegistry<S> {
    store: Option<S>,
    shared: Arc<Shared>,
    notifier: Notifier,
    _handle: Option<SubscriptionHandle>,
}

impl<S: DocumentStore> ContentRegistry<S> {
    /// Connects when a store is configured, otherwise runs on defaults.
    pub async fn open(store: Option<S>, notifier: Notifier) -> Self {
        match store {
            Some(store) => Self::connect(store, notifier).await,
            None => Self::offline(notifier),
        }
    }

    /// Default-only mode. Edits are kept for the lifetime of the registry.
    pub fn offline(notifier: Notifier) -> Self {
        tracing::info!("Content store not configured, using defaults");
        Self {
            store: None,
            shared: Shared::new(ConnectionStatus::NotConfigured, true),
            notifier,
            _handle: None,
        }
    }

    /// Subscribes to the `content` collection. A failed subscription leaves
    /// the registry usable on defaults with status `Degraded`.
    pub async fn connect(store: S, notifier: Notifier) -> Self {
        let shared = Shared::new(ConnectionStatus::Connecting, false);

        let handle = match store.subscribe(collections::CONTENT).await {
            Ok(subscription) => {
                let task = tokio::spawn(pump(subscription, Arc::clone(&shared), notifier.clone()));
                Some(SubscriptionHandle::new(task))
            }
            Err(e) => {
                notifier.warning("Content unavailable", e.to_string());
                shared.status.send_replace(ConnectionStatus::Degraded);
                shared.loaded.send_replace(true);
                None
            }
        };

        Self {
            store: Some(store),
            shared,
            notifier,
            _handle: handle,
        }
    }

    /// Value of slot `id`, or `default` when the slot has no entry.
    pub fn get(&self, id: &str, default: &str) -> String {
        self.shared
            .read()
            .lookup(id)
            .map(|entry| entry.content.clone())
            .unwrap_or_else(|| default.to_string())
    }

    pub fn entry(&self, id: &str) -> Option<ContentEntry> {
        self.shared.read().lookup(id).cloned()
    }

    /// True when slot `id` holds an edit the store has not confirmed.
    pub fn has_local_edit(&self, id: &str) -> bool {
        self.shared.read().local.contains_key(id)
    }

    pub async fn set(&self, id: &str, value: &str) -> Result<(), RemoteWriteWarning> {
        self.set_typed(id, value, ContentKind::Text).await
    }

    /// Upserts slot `id`. The local view changes before the store is
    /// contacted and keeps the value whatever the store answers.
    pub async fn set_typed(
        &self,
        id: &str,
        value: &str,
        kind: ContentKind,
    ) -> Result<(), RemoteWriteWarning> {
        let entry = ContentEntry::new(id, value, kind);
        self.shared.write().local.insert(id.to_string(), entry.clone());

        let result = match &self.store {
            Some(store) => match encode_fields(&entry) {
                Ok(fields) => store.set(collections::CONTENT, id, fields).await,
                Err(e) => Err(e),
            },
            None => Err(StoreError::NotConfigured),
        };

        match result {
            Ok(()) => {
                tracing::debug!("Wrote content/{}", id);
                Ok(())
            }
            Err(error) => {
                if self.store.is_some() {
                    self.shared.status.send_replace(ConnectionStatus::Degraded);
                }
                let warning = RemoteWriteWarning {
                    id: id.to_string(),
                    error,
                };
                self.notifier.warning("Saved locally", warning.to_string());
                Err(warning)
            }
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.shared.status.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.shared.status.subscribe()
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    /// True until the first snapshot arrives.
    pub fn is_loading(&self) -> bool {
        !*self.shared.loaded.borrow()
    }

    /// Waits until the registry stopped loading.
    pub async fn ready(&self) {
        let mut loaded = self.shared.loaded.subscribe();
        let _ = loaded.wait_for(|loaded| *loaded).await;
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn store(&self) -> Option<&S> {
        self.store.as_ref()
    }
}

async fn pump(mut subscription: Subscription, shared: Arc<Shared>, notifier: Notifier) {
    while let Some(event) = subscription.next().await {
        match event {
            StoreEvent::Snapshot(documents) => {
                let entries = decode_snapshot::<ContentEntry>(collections::CONTENT, documents);
                tracing::debug!("Content snapshot with {} entr(ies)", entries.len());
                shared.write().apply_snapshot(entries);
                shared.status.send_replace(ConnectionStatus::Connected);
                shared.loaded.send_replace(true);
            }
            StoreEvent::Error(message) => {
                shared.status.send_replace(ConnectionStatus::Degraded);
                notifier.warning("Content store unavailable", message);
                shared.loaded.send_replace(true);
            }
        }
    }

    tracing::debug!("Content subscription ended");
    shared.status.send_replace(ConnectionStatus::Degraded);
    shared.loaded.send_replace(true);
}
