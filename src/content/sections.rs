use crate::auth::SessionContext;
use crate::models::{collections, SectionBlob};
use crate::notify::Notifier;
use crate::store::{DocumentStore, Fields, StoreError};
use crate::sync::CollectionSync;

use super::field::EditError;

/// The `editable-content` section blobs (hero, about, navigation, footer).
///
/// Each section is one document of free-form string fields. Reads fall back
/// per field; writes merge into the section, creating it on first save.
#[derive(Debug)]
pub struct Sections<S> {
    store: S,
    list: CollectionSync<SectionBlob>,
    notifier: Notifier,
}

impl<S: DocumentStore> Sections<S> {
    pub async fn open(store: S, notifier: Notifier) -> Result<Self, StoreError> {
        let list = CollectionSync::start(&store, notifier.clone()).await?;
        Ok(Self {
            store,
            list,
            notifier,
        })
    }

    pub async fn ready(&self) {
        self.list.ready().await;
    }

    pub fn section(&self, id: &str) -> Option<SectionBlob> {
        self.list.find(id)
    }

    /// String value of `key` in `section`, or `default`.
    pub fn field(&self, section: &str, key: &str, default: &str) -> String {
        self.section(section)
            .and_then(|blob| blob.text(key).map(str::to_string))
            .unwrap_or_else(|| default.to_string())
    }

    /// Merges `values` into `section`.
    pub async fn save(
        &self,
        session: &SessionContext,
        section: &str,
        values: Fields,
    ) -> Result<(), EditError> {
        if !session.is_admin() {
            return Err(EditError::NotAdmin);
        }

        let result = match self
            .store
            .update(collections::EDITABLE_CONTENT, section, values.clone())
            .await
        {
            Err(StoreError::NotFound { .. }) => {
                self.store
                    .set(collections::EDITABLE_CONTENT, section, values)
                    .await
            }
            other => other,
        };

        match result {
            Ok(()) => {
                self.notifier.success("Saved", format!("{} updated", section));
                Ok(())
            }
            Err(e) => {
                self.notifier.error("Save failed", e.to_string());
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Session;
    use crate::fields;
    use crate::models::section_ids;
    use crate::store::MemoryStore;
    use std::time::Duration;

    fn admin() -> SessionContext {
        SessionContext::fixed(Some(Session {
            email: "admin@example.com".to_string(),
            token: "t".to_string(),
        }))
    }

    #[tokio::test]
    async fn test_missing_section_uses_defaults() {
        let sections = Sections::open(MemoryStore::new(), Notifier::silent())
            .await
            .unwrap();
        sections.ready().await;
        assert_eq!(
            sections.field(section_ids::HERO, "heroTitle", "Мастерская"),
            "Мастерская"
        );
    }

    #[tokio::test]
    async fn test_save_creates_then_merges() {
        let store = MemoryStore::new();
        let sections = Sections::open(store.clone(), Notifier::silent())
            .await
            .unwrap();
        let session = admin();

        sections
            .save(&session, section_ids::HERO, fields! { "heroTitle" => "A" })
            .await
            .unwrap();
        sections
            .save(&session, section_ids::HERO, fields! { "heroSubtitle" => "B" })
            .await
            .unwrap();

        let doc = store.get("editable-content", section_ids::HERO).unwrap();
        assert_eq!(doc.fields["heroTitle"], "A");
        assert_eq!(doc.fields["heroSubtitle"], "B");

        for _ in 0..100 {
            if sections.field(section_ids::HERO, "heroSubtitle", "") == "B" {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("section push never arrived");
    }

    #[tokio::test]
    async fn test_visitor_cannot_save() {
        let sections = Sections::open(MemoryStore::new(), Notifier::silent())
            .await
            .unwrap();
        let err = sections
            .save(
                &SessionContext::anonymous(),
                section_ids::FOOTER,
                fields! { "copyright" => "x" },
            )
            .await
            .unwrap_err();
        assert_eq!(err, EditError::NotAdmin);
    }
}
