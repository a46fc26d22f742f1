use super::{AdminError, CollectionEditor};
use crate::fields;
use crate::icons::SocialPreset;
use crate::models::SocialLink;
use crate::store::{DocumentStore, Fields};
use crate::validate::{require, require_if_present, require_url};

pub type SocialEditor<S> = CollectionEditor<S, SocialLink>;

#[derive(Debug, Clone, Default)]
pub struct NewSocialLink {
    pub platform: String,
    pub url: String,
    /// CSS class token or image URL.
    pub icon: String,
}

impl NewSocialLink {
    /// Prefills platform and icon from a preset. A `url` that does not point
    /// at the platform is replaced by the platform's root URL.
    pub fn from_preset(preset: &SocialPreset, url: &str) -> Self {
        Self {
            platform: preset.name.to_string(),
            url: preset.url_for(url.trim()),
            icon: preset.icon.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SocialPatch {
    pub platform: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
}

impl<S: DocumentStore> CollectionEditor<S, SocialLink> {
    pub async fn create(&self, input: NewSocialLink) -> Result<String, AdminError> {
        self.require_admin()?;
        let platform = require("Platform", &input.platform)?;
        let url = require_url("URL", &input.url)?;
        let icon = require("Icon", &input.icon)?;

        self.insert(fields! {
            "platform" => platform,
            "url" => url,
            "icon" => icon,
            "order" => self.next_order(),
        })
        .await
    }

    pub async fn update(&self, id: &str, patch: SocialPatch) -> Result<(), AdminError> {
        self.require_admin()?;

        let mut fields = Fields::new();
        if let Some(platform) = require_if_present("Platform", patch.platform.as_deref())? {
            fields.insert("platform".into(), platform.into());
        }
        if let Some(url) = patch.url.as_deref() {
            fields.insert("url".into(), require_url("URL", url)?.into());
        }
        if let Some(icon) = require_if_present("Icon", patch.icon.as_deref())? {
            fields.insert("icon".into(), icon.into());
        }

        self.patch(id, fields).await
    }
}
