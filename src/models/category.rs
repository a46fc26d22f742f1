use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{collections, Record};

/// Gallery category. `slug` is what gallery items reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record for Category {
    const COLLECTION: &'static str = collections::CATEGORIES;
    const NOUN: &'static str = "category";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

/// Derives a slug from a category name.
///
/// Lowercases, turns each run of whitespace into a single `-` and drops every
/// character that is neither alphanumeric nor `-`. Letters outside ASCII are
/// kept, so Cyrillic names produce Cyrillic slugs.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for c in name.trim().to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
                in_whitespace = true;
            }
            continue;
        }
        in_whitespace = false;
        if c.is_alphanumeric() || c == '-' {
            slug.push(c);
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_cyrillic() {
        assert_eq!(slugify("Реставрация Мебели!"), "реставрация-мебели");
    }

    #[test]
    fn test_slugify_ascii() {
        assert_eq!(slugify("Custom   Orders"), "custom-orders");
        assert_eq!(slugify("Art & Decor"), "art--decor");
        assert_eq!(slugify("  Chairs 2024 "), "chairs-2024");
        assert_eq!(slugify("already-slugged"), "already-slugged");
    }

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!(slugify("\"Quoted\" name?"), "quoted-name");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_category_order_defaults_to_zero() {
        let category: Category =
            serde_json::from_str(r#"{"id":"c1","name":"Art","slug":"art"}"#).unwrap();
        assert_eq!(category.order, 0);
        assert_eq!(category.label(), "Art");
    }
}
