use chrono::Utc;

use super::{AdminError, CollectionEditor};
use crate::fields;
use crate::models::{slugify, Category};
use crate::store::{DocumentStore, Fields};
use crate::validate::{require, require_if_present, ValidationError};

pub type CategoryEditor<S> = CollectionEditor<S, Category>;

#[derive(Debug, Clone, Default)]
pub struct NewCategory {
    pub name: String,
    /// Derived from `name` when blank.
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
}

fn slug_override(slug: Option<&str>) -> Option<String> {
    slug.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl<S: DocumentStore> CollectionEditor<S, Category> {
    pub async fn create(&self, input: NewCategory) -> Result<String, AdminError> {
        self.require_admin()?;
        let name = require("Name", &input.name)?;
        let slug = slug_override(input.slug.as_deref()).unwrap_or_else(|| slugify(&name));
        if slug.is_empty() {
            return Err(ValidationError::Required("Slug").into());
        }

        self.insert(fields! {
            "name" => name,
            "slug" => slug,
            "order" => self.next_order(),
            "createdAt" => Utc::now(),
        })
        .await
    }

    /// Renaming recomputes the slug unless one is given.
    pub async fn update(&self, id: &str, patch: CategoryPatch) -> Result<(), AdminError> {
        self.require_admin()?;
        let name = require_if_present("Name", patch.name.as_deref())?;
        let slug = slug_override(patch.slug.as_deref());

        let mut fields = Fields::new();
        if let Some(name) = name {
            let slug = slug.clone().unwrap_or_else(|| slugify(&name));
            fields.insert("name".into(), name.into());
            fields.insert("slug".into(), slug.into());
        } else if let Some(slug) = slug {
            fields.insert("slug".into(), slug.into());
        }
        if fields.is_empty() {
            return Ok(());
        }
        fields.insert("updatedAt".into(), Utc::now().to_rfc3339().into());

        self.patch(id, fields).await
    }
}
