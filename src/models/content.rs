use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{collections, Record};

/// What a content slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[default]
    Text,
    Link,
    Image,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Text => write!(f, "text"),
            ContentKind::Link => write!(f, "link"),
            ContentKind::Image => write!(f, "image"),
        }
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ContentKind::Text),
            "link" => Ok(ContentKind::Link),
            "image" => Ok(ContentKind::Image),
            _ => Err(format!(
                "Invalid content type '{}'. Valid options: text, link, image",
                s
            )),
        }
    }
}

/// One editable slot on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEntry {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type", default)]
    pub kind: ContentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ContentEntry {
    pub fn new(id: impl Into<String>, content: impl Into<String>, kind: ContentKind) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            kind,
            updated_at: Some(Utc::now()),
        }
    }
}

impl Record for ContentEntry {
    const COLLECTION: &'static str = collections::CONTENT;
    const NOUN: &'static str = "content";

    fn id(&self) -> &str {
        &self.id
    }
}
