//! The inline editing state machine shared by every editable slot.
//!
//! ```text
//!            begin_edit (admin && editable)
//!   Viewing ────────────────────────────────▶ Editing { draft, original }
//!      ▲                                          │
//!      └──────────── save / cancel ───────────────┘
//! ```

use std::future::Future;
use thiserror::Error;

use super::registry::{ContentRegistry, RemoteWriteWarning};
use crate::auth::SessionContext;
use crate::fields;
use crate::models::ContentKind;
use crate::store::{DocumentStore, StoreError};
use crate::validate::{require_url, ValidationError};

/// Shown to admins in place of an empty slot.
pub const EMPTY_PLACEHOLDER: &str = "Click to add content";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldState {
    Viewing,
    Editing { draft: String, original: String },
}

/// What a field renders as right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldView {
    /// The resolved value. `affordance` is set when the viewer may edit it.
    Static { text: String, affordance: bool },
    /// Admin-editable slot with nothing in it.
    Placeholder,
    Editor { draft: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("Only admins can edit content")]
    NotAdmin,
    #[error("This field is not editable here")]
    NotEditable,
    #[error("Field is not being edited")]
    NotEditing,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A save side effect failed. The registry write stands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Follow-up update failed: {0}")]
pub struct HookError(pub String);

/// Side effect run after a successful local save.
pub trait SaveHook: Send + Sync {
    fn after_save(&self, value: &str) -> impl Future<Output = Result<(), HookError>> + Send;
}

/// Copies the saved value into one field of another document, for values
/// duplicated elsewhere (a service title shown in the navigation).
#[derive(Debug, Clone)]
pub struct DenormalizedCopy<S> {
    store: S,
    collection: String,
    id: String,
    field: String,
}

impl<S: DocumentStore> DenormalizedCopy<S> {
    pub fn new(
        store: S,
        collection: impl Into<String>,
        id: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            store,
            collection: collection.into(),
            id: id.into(),
            field: field.into(),
        }
    }
}

impl<S: DocumentStore> SaveHook for DenormalizedCopy<S> {
    async fn after_save(&self, value: &str) -> Result<(), HookError> {
        self.store
            .update(&self.collection, &self.id, fields! { self.field.as_str() => value })
            .await
            .map_err(|e| HookError(format!("{}/{}: {}", self.collection, self.id, e)))
    }
}

/// Outcome of a save that reached `Viewing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub value: String,
    /// Set when the store write failed; the value is still shown locally.
    pub remote: Option<RemoteWriteWarning>,
    pub hook: Option<HookError>,
}

impl SaveReport {
    pub fn is_clean(&self) -> bool {
        self.remote.is_none() && self.hook.is_none()
    }
}

/// One editable slot bound to a registry id.
#[derive(Debug, Clone)]
pub struct EditableField {
    id: String,
    default: String,
    kind: ContentKind,
    editable: bool,
    state: FieldState,
}

impl EditableField {
    pub fn new(id: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            default: default.into(),
            kind: ContentKind::Text,
            editable: true,
            state: FieldState::Viewing,
        }
    }

    pub fn link(id: impl Into<String>, default: impl Into<String>) -> Self {
        Self::new(id, default).with_kind(ContentKind::Link)
    }

    pub fn image(id: impl Into<String>, default: impl Into<String>) -> Self {
        Self::new(id, default).with_kind(ContentKind::Image)
    }

    pub fn with_kind(mut self, kind: ContentKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether the container allows editing this field at all.
    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn state(&self) -> &FieldState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, FieldState::Editing { .. })
    }

    pub fn draft(&self) -> Option<&str> {
        match &self.state {
            FieldState::Editing { draft, .. } => Some(draft),
            FieldState::Viewing => None,
        }
    }

    fn can_edit(&self, session: &SessionContext) -> bool {
        self.editable && session.is_admin()
    }

    /// Current display value: registry entry or the field's default.
    pub fn value<S: DocumentStore>(&self, registry: &ContentRegistry<S>) -> String {
        registry.get(&self.id, &self.default)
    }

    pub fn view<S: DocumentStore>(
        &self,
        registry: &ContentRegistry<S>,
        session: &SessionContext,
    ) -> FieldView {
        match &self.state {
            FieldState::Editing { draft, .. } => FieldView::Editor {
                draft: draft.clone(),
            },
            FieldState::Viewing => {
                let text = self.value(registry);
                let affordance = self.can_edit(session);
                if affordance && text.trim().is_empty() {
                    FieldView::Placeholder
                } else {
                    FieldView::Static { text, affordance }
                }
            }
        }
    }

    /// Enters `Editing` with the current value as draft. Calling it while
    /// already editing keeps the existing draft.
    pub fn begin_edit<S: DocumentStore>(
        &mut self,
        registry: &ContentRegistry<S>,
        session: &SessionContext,
    ) -> Result<(), EditError> {
        if !session.is_admin() {
            return Err(EditError::NotAdmin);
        }
        if !self.editable {
            return Err(EditError::NotEditable);
        }
        if self.is_editing() {
            return Ok(());
        }

        let current = self.value(registry);
        self.state = FieldState::Editing {
            draft: current.clone(),
            original: current,
        };
        Ok(())
    }

    pub fn set_draft(&mut self, text: impl Into<String>) -> Result<(), EditError> {
        match &mut self.state {
            FieldState::Editing { draft, .. } => {
                *draft = text.into();
                Ok(())
            }
            FieldState::Viewing => Err(EditError::NotEditing),
        }
    }

    /// Drops the draft and returns to `Viewing`. Returns the pre-edit value.
    pub fn cancel(&mut self) -> Option<String> {
        match std::mem::replace(&mut self.state, FieldState::Viewing) {
            FieldState::Editing { original, .. } => Some(original),
            FieldState::Viewing => None,
        }
    }

    pub async fn save<S: DocumentStore>(
        &mut self,
        registry: &ContentRegistry<S>,
        session: &SessionContext,
    ) -> Result<SaveReport, EditError> {
        self.commit(registry, session, None::<&NoHook>).await
    }

    /// Saves, then runs `hook`. A hook failure is reported, not rolled back.
    pub async fn save_with<S: DocumentStore, H: SaveHook>(
        &mut self,
        registry: &ContentRegistry<S>,
        session: &SessionContext,
        hook: &H,
    ) -> Result<SaveReport, EditError> {
        self.commit(registry, session, Some(hook)).await
    }

    async fn commit<S: DocumentStore, H: SaveHook>(
        &mut self,
        registry: &ContentRegistry<S>,
        session: &SessionContext,
        hook: Option<&H>,
    ) -> Result<SaveReport, EditError> {
        let FieldState::Editing { draft, .. } = &self.state else {
            return Err(EditError::NotEditing);
        };
        if !session.is_admin() {
            return Err(EditError::NotAdmin);
        }

        let value = match self.kind {
            ContentKind::Text => draft.clone(),
            ContentKind::Link => require_url("Link", draft)?,
            ContentKind::Image => require_url("Image URL", draft)?,
        };

        let remote = registry
            .set_typed(&self.id, &value, self.kind)
            .await
            .err();

        let hook = match hook {
            Some(hook) => match hook.after_save(&value).await {
                Ok(()) => None,
                Err(e) => {
                    registry.notifier().error("Save incomplete", e.to_string());
                    Some(e)
                }
            },
            None => None,
        };

        if remote.is_none() && hook.is_none() {
            registry.notifier().success("Saved", format!("{} updated", self.id));
        }

        self.state = FieldState::Viewing;
        Ok(SaveReport {
            value,
            remote,
            hook,
        })
    }
}

/// Stand-in hook type for saves without a side effect.
struct NoHook;

impl SaveHook for NoHook {
    async fn after_save(&self, _value: &str) -> Result<(), HookError> {
        Ok(())
    }
}
