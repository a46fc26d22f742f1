use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{collections, Record};

/// Section ids in the `editable-content` collection.
pub mod section_ids {
    pub const HERO: &str = "hero-section";
    pub const ABOUT: &str = "about-section";
    pub const NAV: &str = "nav-section";
    pub const NAV_SHOP: &str = "nav-shop";
    pub const FOOTER: &str = "footer-section";
}

/// A free-form section document, e.g. `hero-section` with `heroTitle`,
/// `heroSubtitle` and friends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionBlob {
    pub id: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl SectionBlob {
    /// String value of `key`, if present and a string.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

impl Record for SectionBlob {
    const COLLECTION: &'static str = collections::EDITABLE_CONTENT;
    const NOUN: &'static str = "section";

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_blob_flattens_fields() {
        let blob: SectionBlob = serde_json::from_str(
            r#"{"id":"hero-section","heroTitle":"Мастерская","heroCta1":"Заказать"}"#,
        )
        .unwrap();
        assert_eq!(blob.text("heroTitle"), Some("Мастерская"));
        assert_eq!(blob.text("heroCta2"), None);
        assert!(!blob.fields.contains_key("id"));
    }
}
