use serde::{Deserialize, Serialize};

use super::{collections, Record};
use crate::icons::ServiceIcon;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Symbolic icon name, see [`ServiceIcon`].
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub order: i64,
}

impl Service {
    /// Icon to render; unknown names fall back to the default icon.
    pub fn icon(&self) -> ServiceIcon {
        ServiceIcon::resolve(&self.icon)
    }
}

impl Record for Service {
    const COLLECTION: &'static str = collections::SERVICES;
    const NOUN: &'static str = "service";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.title
    }
}
