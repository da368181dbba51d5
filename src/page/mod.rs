//! Page Controls
//!
//! Small form helpers that sit next to the views.

pub mod form;
pub mod toggle;

pub use form::{LoadingIndicator, MemoryButton, MemoryIndicator, SubmitControl, SubmitGuard};
pub use toggle::{FieldToggle, MemoryField, TextField, ToggleState, UndoBuffer, PLACEHOLDER};
