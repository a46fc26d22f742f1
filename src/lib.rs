//! Atelier: the content layer behind a furniture-restoration studio website.
//!
//! Admins sign in and edit text, images, services, gallery entries,
//! categories and social links directly on the live page. The crate keeps a
//! read-through cache of every collection, refreshed by realtime pushes from
//! the document store, and writes edits through to it.
//!
//! The main pieces:
//! - [`store`]: the document store seam plus in-memory, on-disk and remote
//!   implementations
//! - [`auth`]: the auth gate and the session context handed to views
//! - [`content`]: the content registry and the editable field state machine
//! - [`sync`]: realtime collection-to-list synchronization
//! - [`admin`]: CRUD editors for categories, services, gallery, social links
//!   and the contact inbox
//! - [`site`]: page composition for `/` and `/admin`
//! - [`server`]: HTTP/WebSocket host for the store and the pages

pub mod admin;
pub mod auth;
pub mod config;
pub mod content;
pub mod icons;
pub mod models;
pub mod notify;
pub mod server;
pub mod site;
pub mod store;
pub mod sync;
pub mod upload;
pub mod validate;

pub use auth::{AuthGate, AuthProvider, Session, SessionContext};
pub use content::{ContentRegistry, EditableField};
pub use notify::{Notice, Notifier};
pub use store::{DocumentStore, MemoryStore, RemoteStore, StoreError};
pub use sync::CollectionSync;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
