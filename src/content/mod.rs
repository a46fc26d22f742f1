//! Editable page content.
//!
//! [`ContentRegistry`] maps slot ids such as `hero-title` to strings, backed
//! by the `content` collection. [`EditableField`] is the per-slot
//! view/edit state machine on top of it. [`Sections`] covers the
//! `editable-content` section documents.

mod field;
mod registry;
mod sections;

pub use field::{
    DenormalizedCopy, EditError, EditableField, FieldState, FieldView, HookError, SaveHook,
    SaveReport, EMPTY_PLACEHOLDER,
};
pub use registry::{ConnectionStatus, ContentRegistry, RemoteWriteWarning};
pub use sections::Sections;
