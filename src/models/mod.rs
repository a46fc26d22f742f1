//! Records stored in the document store.
//!
//! Every record type maps to exactly one collection. Identifiers are assigned
//! by the store, except for [`ContentEntry`] whose id is a caller-chosen slot
//! name such as `hero-title`.

mod category;
mod contact;
mod content;
mod gallery;
mod section;
mod service;
mod social_link;

pub use category::{slugify, Category};
pub use contact::{ContactStatus, ContactSubmission};
pub use content::{ContentEntry, ContentKind};
pub use gallery::GalleryItem;
pub use section::{section_ids, SectionBlob};
pub use service::Service;
pub use social_link::SocialLink;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Collection names used by the site.
pub mod collections {
    pub const CONTENT: &str = "content";
    pub const CATEGORIES: &str = "categories";
    pub const SERVICES: &str = "services";
    pub const GALLERY: &str = "gallery";
    pub const SOCIAL_LINKS: &str = "social-links";
    pub const CONTACTS: &str = "contacts";
    pub const EDITABLE_CONTENT: &str = "editable-content";

    pub const ALL: [&str; 7] = [
        CONTENT,
        CATEGORIES,
        SERVICES,
        GALLERY,
        SOCIAL_LINKS,
        CONTACTS,
        EDITABLE_CONTENT,
    ];

    /// Whether anonymous viewers may read `name`. Contact requests are
    /// admin-only.
    pub fn is_public(name: &str) -> bool {
        name != CONTACTS
    }
}

/// A record type bound to one collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection holding records of this type.
    const COLLECTION: &'static str;
    /// Human noun used in prompts and notices ("category", "work").
    const NOUN: &'static str;

    fn id(&self) -> &str;

    /// Name shown when asking to confirm a delete.
    fn label(&self) -> &str {
        self.id()
    }
}
