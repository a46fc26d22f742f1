//! Admin editors for the collection-backed parts of the site.
//!
//! Every editor is a [`CollectionEditor`] over one record type: a live list
//! plus create/update/delete writes gated on an admin session. Input is
//! validated before any store call, deletes need an explicit confirmation,
//! and new records are appended (`order` = current list length).
//!
//! The contact inbox is the one place an anonymous viewer can write, through
//! [`submit_contact`].

mod categories;
mod contacts;
mod editor;
mod gallery;
mod services;
mod social;

pub use categories::{CategoryEditor, CategoryPatch, NewCategory};
pub use contacts::{submit_contact, ContactInbox, ContactPatch, NewContact};
pub use editor::{CollectionEditor, Confirm, DeleteOutcome};
pub use gallery::{GalleryEditor, GalleryPatch, ImageInput, NewGalleryItem};
pub use services::{NewService, ServiceEditor, ServicePatch};
pub use social::{NewSocialLink, SocialEditor, SocialPatch};

use thiserror::Error;

use crate::store::StoreError;
use crate::upload::UploadError;
use crate::validate::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminError {
    #[error("Admin session required")]
    NotAuthorized,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
