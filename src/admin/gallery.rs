use chrono::Utc;

use super::{AdminError, CollectionEditor};
use crate::fields;
use crate::models::GalleryItem;
use crate::store::{DocumentStore, Fields};
use crate::upload::{ImageHost, ImageUpload, UploadError};
use crate::validate::{require, require_if_present, require_url, ValidationError};

pub type GalleryEditor<S> = CollectionEditor<S, GalleryItem>;

/// Where a gallery image comes from. Exactly one of the two must be set.
#[derive(Debug, Clone, Default)]
pub struct ImageInput {
    pub upload: Option<ImageUpload>,
    pub url: Option<String>,
}

impl ImageInput {
    pub fn upload(image: ImageUpload) -> Self {
        Self {
            upload: Some(image),
            url: None,
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self {
            upload: None,
            url: Some(url.into()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewGalleryItem {
    pub title: String,
    pub description: String,
    /// Category slug.
    pub category: String,
    pub image: ImageInput,
}

#[derive(Debug, Clone, Default)]
pub struct GalleryPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

enum ImageSource<'a> {
    Upload(&'a ImageUpload),
    Url(String),
}

fn image_source(input: &ImageInput) -> Result<ImageSource<'_>, ValidationError> {
    let url = input
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty());

    match (&input.upload, url) {
        (Some(_), Some(_)) => Err(ValidationError::AmbiguousImage),
        (None, None) => Err(ValidationError::MissingImage),
        (Some(upload), None) => Ok(ImageSource::Upload(upload)),
        (None, Some(url)) => Ok(ImageSource::Url(require_url("Image URL", url)?)),
    }
}

impl<S: DocumentStore> CollectionEditor<S, GalleryItem> {
    /// Adds a work. Upload mode needs `uploader`; without it the call fails
    /// with [`UploadError::NotConfigured`].
    pub async fn create(
        &self,
        input: NewGalleryItem,
        uploader: Option<&ImageHost>,
    ) -> Result<String, AdminError> {
        self.require_admin()?;
        let title = require("Title", &input.title)?;
        let description = require("Description", &input.description)?;
        let category = require("Category", &input.category)?;
        let source = image_source(&input.image)?;

        let image_url = match source {
            ImageSource::Url(url) => url,
            ImageSource::Upload(image) => {
                let host = uploader.ok_or(UploadError::NotConfigured).inspect_err(|e| {
                    self.notifier.error("Upload unavailable", e.to_string());
                })?;
                match host.upload(image).await {
                    Ok(url) => url,
                    Err(e) => {
                        self.notifier.error("Upload failed", e.to_string());
                        return Err(e.into());
                    }
                }
            }
        };

        self.insert(fields! {
            "title" => title,
            "description" => description,
            "category" => category,
            "imageUrl" => image_url,
            "order" => self.next_order(),
            "createdAt" => Utc::now(),
        })
        .await
    }

    pub async fn update(&self, id: &str, patch: GalleryPatch) -> Result<(), AdminError> {
        self.require_admin()?;

        let mut fields = Fields::new();
        if let Some(title) = require_if_present("Title", patch.title.as_deref())? {
            fields.insert("title".into(), title.into());
        }
        if let Some(description) = require_if_present("Description", patch.description.as_deref())? {
            fields.insert("description".into(), description.into());
        }
        if let Some(category) = require_if_present("Category", patch.category.as_deref())? {
            fields.insert("category".into(), category.into());
        }
        if let Some(url) = patch.image_url.as_deref() {
            fields.insert("imageUrl".into(), require_url("Image URL", url)?.into());
        }

        self.patch(id, fields).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Session, SessionContext};
    use crate::notify::Notifier;
    use crate::store::testing::FlakyStore;
    use crate::store::MemoryStore;
    use std::time::Duration;

    fn admin() -> SessionContext {
        SessionContext::fixed(Some(Session {
            email: "admin@example.com".to_string(),
            token: "t".to_string(),
        }))
    }

    fn work(title: &str) -> NewGalleryItem {
        NewGalleryItem {
            title: title.to_string(),
            description: "Oak, 19th century".to_string(),
            category: "restoration".to_string(),
            image: ImageInput::url("https://i.ibb.co/x/chest.jpg"),
        }
    }

    async fn wait_for_len(editor: &GalleryEditor<MemoryStore>, len: usize) {
        for _ in 0..200 {
            if editor.len() == len {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("list never reached {} items", len);
    }

    #[tokio::test]
    async fn test_append_order_follows_list_length() {
        let store = MemoryStore::new();
        let editor = GalleryEditor::open(store.clone(), admin(), Notifier::silent())
            .await
            .unwrap();
        editor.ready().await;

        let first = editor.create(work("Chest"), None).await.unwrap();
        wait_for_len(&editor, 1).await;
        let second = editor.create(work("Table"), None).await.unwrap();

        assert_eq!(store.get("gallery", &first).unwrap().fields["order"], 0);
        assert_eq!(store.get("gallery", &second).unwrap().fields["order"], 1);
    }

    #[tokio::test]
    async fn test_append_ignores_gaps() {
        let store = MemoryStore::new();
        store
            .add("gallery", fields! { "title" => "A", "order" => 0 })
            .await
            .unwrap();
        store
            .add("gallery", fields! { "title" => "B", "order" => 7 })
            .await
            .unwrap();
        let editor = GalleryEditor::open(store.clone(), admin(), Notifier::silent())
            .await
            .unwrap();
        editor.ready().await;

        let id = editor.create(work("C"), None).await.unwrap();
        assert_eq!(store.get("gallery", &id).unwrap().fields["order"], 2);
    }

    #[tokio::test]
    async fn test_image_source_must_be_exactly_one() {
        let store = MemoryStore::new();
        let editor = GalleryEditor::open(store.clone(), admin(), Notifier::silent())
            .await
            .unwrap();

        let mut both = work("X");
        both.image.upload = Some(ImageUpload::new("x.jpg", vec![1]));
        assert_eq!(
            editor.create(both, None).await.unwrap_err(),
            AdminError::Validation(ValidationError::AmbiguousImage)
        );

        let mut neither = work("X");
        neither.image = ImageInput::default();
        assert_eq!(
            editor.create(neither, None).await.unwrap_err(),
            AdminError::Validation(ValidationError::MissingImage)
        );
        assert!(store.snapshot("gallery").is_empty());
    }

    #[tokio::test]
    async fn test_blank_description_rejected_before_store() {
        let store = FlakyStore::new();
        store.fail_writes(true);
        let editor = GalleryEditor::open(store.clone(), admin(), Notifier::silent())
            .await
            .unwrap();

        let mut input = work("Комод");
        input.description = "   ".to_string();

        assert_eq!(
            editor.create(input, None).await.unwrap_err(),
            AdminError::Validation(ValidationError::Required("Description"))
        );
        assert!(store.inner.snapshot("gallery").is_empty());
    }

    #[tokio::test]
    async fn test_upload_without_key_is_config_error() {
        let store = MemoryStore::new();
        let editor = GalleryEditor::open(store.clone(), admin(), Notifier::silent())
            .await
            .unwrap();

        let mut input = work("X");
        input.image = ImageInput::upload(ImageUpload::new("x.jpg", vec![1, 2]));

        assert_eq!(
            editor.create(input, None).await.unwrap_err(),
            AdminError::Upload(UploadError::NotConfigured)
        );
        assert!(store.snapshot("gallery").is_empty());
    }

    #[tokio::test]
    async fn test_update_validates_image_url() {
        let store = MemoryStore::new();
        let editor = GalleryEditor::open(store.clone(), admin(), Notifier::silent())
            .await
            .unwrap();
        let id = editor.create(work("Chest"), None).await.unwrap();

        let err = editor
            .update(
                &id,
                GalleryPatch {
                    image_url: Some("ftp://files/x.jpg".to_string()),
                    ..GalleryPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AdminError::Validation(ValidationError::InvalidUrl { .. })
        ));
    }
}
