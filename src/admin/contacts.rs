use chrono::Utc;
use serde_json::Value;

use super::{AdminError, CollectionEditor};
use crate::fields;
use crate::models::{collections, ContactStatus, ContactSubmission};
use crate::notify::Notifier;
use crate::store::{DocumentStore, Fields};
use crate::validate::{require, require_email, require_if_present};

/// Admin view over contact requests.
pub type ContactInbox<S> = CollectionEditor<S, ContactSubmission>;

/// What a visitor fills into the contact form.
#[derive(Debug, Clone, Default)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Name of the service the visitor asks about.
    pub service: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub service: Option<String>,
    pub message: Option<String>,
    pub status: Option<ContactStatus>,
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Stores a request from the public contact form. No session is needed.
pub async fn submit_contact<S: DocumentStore>(
    store: &S,
    input: &NewContact,
    notifier: &Notifier,
) -> Result<String, AdminError> {
    let name = require("Name", &input.name)?;
    let email = require_email(&input.email)?;
    let message = require("Message", &input.message)?;

    let mut fields = fields! {
        "name" => name,
        "email" => email,
        "message" => message,
        "status" => ContactStatus::New,
        "submittedAt" => Utc::now(),
    };
    if let Some(phone) = optional(&input.phone) {
        fields.insert("phone".into(), phone.into());
    }
    if let Some(service) = optional(&input.service) {
        fields.insert("service".into(), service.into());
    }

    match store.add(collections::CONTACTS, fields).await {
        Ok(id) => {
            notifier.success("Request sent", "We will get back to you soon");
            Ok(id)
        }
        Err(e) => {
            notifier.error("Could not send request", e.to_string());
            Err(e.into())
        }
    }
}

impl<S: DocumentStore> CollectionEditor<S, ContactSubmission> {
    pub async fn set_status(&self, id: &str, status: ContactStatus) -> Result<(), AdminError> {
        self.require_admin()?;
        self.patch(id, fields! { "status" => status }).await
    }

    /// Merge-updates a request. Blank phone or service clears the field.
    pub async fn update(&self, id: &str, patch: ContactPatch) -> Result<(), AdminError> {
        self.require_admin()?;

        let mut fields = Fields::new();
        if let Some(name) = require_if_present("Name", patch.name.as_deref())? {
            fields.insert("name".into(), name.into());
        }
        if let Some(email) = patch.email.as_deref() {
            fields.insert("email".into(), require_email(email)?.into());
        }
        if let Some(message) = require_if_present("Message", patch.message.as_deref())? {
            fields.insert("message".into(), message.into());
        }
        if let Some(phone) = patch.phone.as_deref() {
            fields.insert("phone".into(), optional(phone).map_or(Value::Null, Value::from));
        }
        if let Some(service) = patch.service.as_deref() {
            fields.insert(
                "service".into(),
                optional(service).map_or(Value::Null, Value::from),
            );
        }
        if let Some(status) = patch.status {
            fields.insert("status".into(), status.to_string().into());
        }

        self.patch(id, fields).await
    }

    /// Number of requests per status, in `new`, `in-progress`, `completed`
    /// order.
    pub fn count_by_status(&self) -> [(ContactStatus, usize); 3] {
        let items = self.items();
        [
            ContactStatus::New,
            ContactStatus::InProgress,
            ContactStatus::Completed,
        ]
        .map(|status| (status, items.iter().filter(|c| c.status == status).count()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Session, SessionContext};
    use crate::store::MemoryStore;
    use crate::validate::ValidationError;
    use std::time::Duration;

    fn admin() -> SessionContext {
        SessionContext::fixed(Some(Session {
            email: "admin@example.com".to_string(),
            token: "t".to_string(),
        }))
    }

    fn request() -> NewContact {
        NewContact {
            name: "Anna".to_string(),
            email: "anna@example.com".to_string(),
            phone: "  ".to_string(),
            service: "Gilding".to_string(),
            message: "Can you restore a mirror frame?".to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_is_anonymous_and_starts_new() {
        let store = MemoryStore::new();
        let id = submit_contact(&store, &request(), &Notifier::silent())
            .await
            .unwrap();

        let doc = store.get("contacts", &id).unwrap();
        assert_eq!(doc.fields["status"], "new");
        assert_eq!(doc.fields["service"], "Gilding");
        assert!(!doc.fields.contains_key("phone"));
        assert!(doc.fields.contains_key("submittedAt"));
    }

    #[tokio::test]
    async fn test_submit_rejects_bad_email() {
        let store = MemoryStore::new();
        let mut input = request();
        input.email = "anna@localhost".to_string();

        let err = submit_contact(&store, &input, &Notifier::silent())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            AdminError::Validation(ValidationError::InvalidEmail("anna@localhost".to_string()))
        );
        assert!(store.snapshot("contacts").is_empty());
    }

    #[tokio::test]
    async fn test_any_status_transition_allowed() {
        let store = MemoryStore::new();
        let id = submit_contact(&store, &request(), &Notifier::silent())
            .await
            .unwrap();
        let inbox = ContactInbox::open(store.clone(), admin(), Notifier::silent())
            .await
            .unwrap();

        inbox.set_status(&id, ContactStatus::Completed).await.unwrap();
        assert_eq!(store.get("contacts", &id).unwrap().fields["status"], "completed");

        inbox.set_status(&id, ContactStatus::New).await.unwrap();
        assert_eq!(store.get("contacts", &id).unwrap().fields["status"], "new");
    }

    #[tokio::test]
    async fn test_count_by_status() {
        let store = MemoryStore::new();
        let first = submit_contact(&store, &request(), &Notifier::silent())
            .await
            .unwrap();
        submit_contact(&store, &request(), &Notifier::silent())
            .await
            .unwrap();
        let inbox = ContactInbox::open(store.clone(), admin(), Notifier::silent())
            .await
            .unwrap();
        inbox.set_status(&first, ContactStatus::InProgress).await.unwrap();

        let mut counts = inbox.count_by_status();
        for _ in 0..200 {
            if counts[1].1 == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
            counts = inbox.count_by_status();
        }

        assert_eq!(
            counts,
            [
                (ContactStatus::New, 1),
                (ContactStatus::InProgress, 1),
                (ContactStatus::Completed, 0),
            ]
        );
    }

    #[tokio::test]
    async fn test_update_clears_blank_phone() {
        let store = MemoryStore::new();
        let mut input = request();
        input.phone = "+7 900 000-00-00".to_string();
        let id = submit_contact(&store, &input, &Notifier::silent())
            .await
            .unwrap();
        let inbox = ContactInbox::open(store.clone(), admin(), Notifier::silent())
            .await
            .unwrap();

        inbox
            .update(
                &id,
                ContactPatch {
                    phone: Some(String::new()),
                    ..ContactPatch::default()
                },
            )
            .await
            .unwrap();

        let doc = store.get("contacts", &id).unwrap();
        assert!(doc.fields["phone"].is_null());
        let contact: ContactSubmission = doc.decode().unwrap();
        assert!(contact.phone.is_none());
    }
}
