use chrono::Utc;

use super::{AdminError, CollectionEditor};
use crate::fields;
use crate::icons::ServiceIcon;
use crate::models::Service;
use crate::store::{DocumentStore, Fields};
use crate::validate::{require, require_if_present};

pub type ServiceEditor<S> = CollectionEditor<S, Service>;

#[derive(Debug, Clone, Default)]
pub struct NewService {
    pub title: String,
    pub description: String,
    /// Icon name; blank picks the default icon.
    pub icon: String,
}

#[derive(Debug, Clone, Default)]
pub struct ServicePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

fn parse_icon(name: &str) -> Result<ServiceIcon, AdminError> {
    if name.trim().is_empty() {
        return Ok(ServiceIcon::default());
    }
    Ok(name.parse::<ServiceIcon>()?)
}

impl<S: DocumentStore> CollectionEditor<S, Service> {
    pub async fn create(&self, input: NewService) -> Result<String, AdminError> {
        self.require_admin()?;
        let title = require("Title", &input.title)?;
        let description = require("Description", &input.description)?;
        let icon = parse_icon(&input.icon)?;

        self.insert(fields! {
            "title" => title,
            "description" => description,
            "icon" => icon.name(),
            "order" => self.next_order(),
            "createdAt" => Utc::now(),
        })
        .await
    }

    pub async fn update(&self, id: &str, patch: ServicePatch) -> Result<(), AdminError> {
        self.require_admin()?;

        let mut fields = Fields::new();
        if let Some(title) = require_if_present("Title", patch.title.as_deref())? {
            fields.insert("title".into(), title.into());
        }
        if let Some(description) = require_if_present("Description", patch.description.as_deref())? {
            fields.insert("description".into(), description.into());
        }
        if let Some(icon) = patch.icon.as_deref() {
            fields.insert("icon".into(), parse_icon(icon)?.name().into());
        }

        self.patch(id, fields).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Session, SessionContext};
    use crate::notify::Notifier;
    use crate::store::MemoryStore;
    use crate::validate::ValidationError;

    fn admin() -> SessionContext {
        SessionContext::fixed(Some(Session {
            email: "admin@example.com".to_string(),
            token: "t".to_string(),
        }))
    }

    #[tokio::test]
    async fn test_create_with_default_icon() {
        let store = MemoryStore::new();
        let editor = ServiceEditor::open(store.clone(), admin(), Notifier::silent())
            .await
            .unwrap();
        editor.ready().await;

        let id = editor
            .create(NewService {
                title: "Gilding".to_string(),
                description: "Gold leaf on frames".to_string(),
                icon: String::new(),
            })
            .await
            .unwrap();

        let doc = store.get("services", &id).unwrap();
        assert_eq!(doc.fields["icon"], "Hammer");
        assert_eq!(doc.fields["order"], 0);
    }

    #[tokio::test]
    async fn test_unknown_icon_rejected() {
        let store = MemoryStore::new();
        let editor = ServiceEditor::open(store.clone(), admin(), Notifier::silent())
            .await
            .unwrap();

        let err = editor
            .create(NewService {
                title: "Gilding".to_string(),
                description: "Gold".to_string(),
                icon: "Sofa".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(
            err,
            AdminError::Validation(ValidationError::UnknownIcon("Sofa".to_string()))
        );
        assert!(store.snapshot("services").is_empty());
    }

    #[tokio::test]
    async fn test_update_normalizes_icon_name() {
        let store = MemoryStore::new();
        let editor = ServiceEditor::open(store.clone(), admin(), Notifier::silent())
            .await
            .unwrap();
        let id = editor
            .create(NewService {
                title: "Caning".to_string(),
                description: "Chair seats".to_string(),
                icon: "Scissors".to_string(),
            })
            .await
            .unwrap();

        editor
            .update(
                &id,
                ServicePatch {
                    icon: Some("paintbucket".to_string()),
                    ..ServicePatch::default()
                },
            )
            .await
            .unwrap();

        let doc = store.get("services", &id).unwrap();
        assert_eq!(doc.fields["icon"], "PaintBucket");
        assert_eq!(doc.fields["title"], "Caning");
    }
}
