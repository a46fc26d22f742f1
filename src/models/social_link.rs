use serde::{Deserialize, Serialize};

use super::{collections, Record};
use crate::icons::SocialIcon;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLink {
    pub id: String,
    pub platform: String,
    pub url: String,
    /// CSS class token (`fab fa-vk`) or an image URL.
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub order: i64,
}

impl SocialLink {
    pub fn icon(&self) -> SocialIcon<'_> {
        SocialIcon::classify(&self.icon)
    }
}

impl Record for SocialLink {
    const COLLECTION: &'static str = collections::SOCIAL_LINKS;
    const NOUN: &'static str = "social link";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.platform
    }
}
