use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{collections, Record};

/// A finished piece shown in the gallery.
///
/// `category` holds a category slug by convention only; nothing stops it from
/// pointing at a category that no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for GalleryItem {
    const COLLECTION: &'static str = collections::GALLERY;
    const NOUN: &'static str = "work";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gallery_item_camel_case() {
        let item: GalleryItem = serde_json::from_str(
            r#"{"id":"g1","title":"Oak chest","imageUrl":"https://i.ibb.co/x.jpg","category":"restoration","order":3}"#,
        )
        .unwrap();
        assert_eq!(item.image_url, "https://i.ibb.co/x.jpg");
        assert_eq!(item.category, "restoration");

        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("imageUrl").is_some());
        assert!(json.get("createdAt").is_none());
    }
}
