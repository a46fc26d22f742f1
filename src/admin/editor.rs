use crate::auth::SessionContext;
use crate::models::{collections, Record};
use crate::notify::Notifier;
use crate::store::{DocumentStore, Fields, StoreError};
use crate::sync::CollectionSync;

use super::AdminError;

/// Asks the operator to confirm a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

/// CRUD view over one collection: a live list plus document-level writes.
///
/// Writes never touch the list directly; the change shows up with the next
/// subscription push.
#[derive(Debug)]
pub struct CollectionEditor<S, T> {
    pub(super) store: S,
    pub(super) list: CollectionSync<T>,
    pub(super) session: SessionContext,
    pub(super) notifier: Notifier,
}

impl<S: DocumentStore, T: Record> CollectionEditor<S, T> {
    pub async fn open(
        store: S,
        session: SessionContext,
        notifier: Notifier,
    ) -> Result<Self, AdminError> {
        if !collections::is_public(T::COLLECTION) && !session.is_admin() {
            return Err(AdminError::NotAuthorized);
        }

        let list = match CollectionSync::start(&store, notifier.clone()).await {
            Ok(list) => list,
            Err(e) => {
                notifier.error(format!("Could not load {}", T::COLLECTION), e.to_string());
                return Err(e.into());
            }
        };

        Ok(Self {
            store,
            list,
            session,
            notifier,
        })
    }

    pub async fn ready(&self) {
        self.list.ready().await;
    }

    pub fn items(&self) -> Vec<T> {
        self.list.items()
    }

    pub fn find(&self, id: &str) -> Option<T> {
        self.list.find(id)
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn list(&self) -> &CollectionSync<T> {
        &self.list
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Order for a new record: the current list length.
    pub fn next_order(&self) -> i64 {
        self.list.len() as i64
    }

    pub(super) fn require_admin(&self) -> Result<(), AdminError> {
        if self.session.is_admin() {
            Ok(())
        } else {
            Err(AdminError::NotAuthorized)
        }
    }

    pub(super) fn report<R>(
        &self,
        result: Result<R, StoreError>,
        action: &str,
    ) -> Result<R, AdminError> {
        match result {
            Ok(value) => {
                self.notifier
                    .success(capitalize(T::NOUN), format!("{} {}", T::NOUN, action));
                Ok(value)
            }
            Err(e) => {
                self.notifier.error(
                    format!("Could not save {}", T::NOUN),
                    e.to_string(),
                );
                Err(e.into())
            }
        }
    }

    pub(super) async fn insert(&self, fields: Fields) -> Result<String, AdminError> {
        let result = self.store.add(T::COLLECTION, fields).await;
        self.report(result, "added")
    }

    pub(super) async fn patch(&self, id: &str, fields: Fields) -> Result<(), AdminError> {
        if fields.is_empty() {
            return Ok(());
        }
        let result = self.store.update(T::COLLECTION, id, fields).await;
        self.report(result, "updated")
    }

    /// Deletes after `confirm` accepted a prompt naming the record.
    pub async fn delete(&self, id: &str, confirm: &impl Confirm) -> Result<DeleteOutcome, AdminError> {
        self.require_admin()?;

        let label = self
            .find(id)
            .map(|record| record.label().to_string())
            .unwrap_or_else(|| id.to_string());
        let prompt = format!("Delete {} \"{}\"?", T::NOUN, label);

        if !confirm.confirm(&prompt) {
            tracing::debug!("Delete of {}/{} cancelled", T::COLLECTION, id);
            return Ok(DeleteOutcome::Cancelled);
        }

        let result = self.store.delete(T::COLLECTION, id).await;
        self.report(result, "deleted")?;
        Ok(DeleteOutcome::Deleted)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Session;
    use crate::fields;
    use crate::models::{Category, ContactSubmission};
    use crate::store::MemoryStore;
    use std::cell::RefCell;

    fn admin() -> SessionContext {
        SessionContext::fixed(Some(Session {
            email: "admin@example.com".to_string(),
            token: "t".to_string(),
        }))
    }

    #[tokio::test]
    async fn test_delete_asks_with_entity_name() {
        let store = MemoryStore::new();
        let id = store
            .add("categories", fields! { "name" => "Chairs", "slug" => "chairs" })
            .await
            .unwrap();
        let editor = CollectionEditor::<_, Category>::open(store.clone(), admin(), Notifier::silent())
            .await
            .unwrap();
        editor.ready().await;

        let asked = RefCell::new(String::new());
        let decline = |prompt: &str| {
            *asked.borrow_mut() = prompt.to_string();
            false
        };

        assert_eq!(editor.delete(&id, &decline).await.unwrap(), DeleteOutcome::Cancelled);
        assert_eq!(*asked.borrow(), "Delete category \"Chairs\"?");
        assert!(store.get("categories", &id).is_some());

        assert_eq!(
            editor.delete(&id, &|_: &str| true).await.unwrap(),
            DeleteOutcome::Deleted
        );
        assert!(store.get("categories", &id).is_none());
    }

    #[tokio::test]
    async fn test_visitor_cannot_delete() {
        let store = MemoryStore::new();
        let editor = CollectionEditor::<_, Category>::open(
            store,
            SessionContext::anonymous(),
            Notifier::silent(),
        )
        .await
        .unwrap();

        let err = editor.delete("x", &|_: &str| true).await.unwrap_err();
        assert!(matches!(err, AdminError::NotAuthorized));
    }

    #[tokio::test]
    async fn test_contacts_inbox_requires_admin_to_open() {
        let result = CollectionEditor::<_, ContactSubmission>::open(
            MemoryStore::new(),
            SessionContext::anonymous(),
            Notifier::silent(),
        )
        .await;
        assert!(matches!(result, Err(AdminError::NotAuthorized)));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("social link"), "Social link");
        assert_eq!(capitalize(""), "");
    }
}
