//! Field Blank/Restore Toggle
//!
//! A button next to a text field that blanks the field and later restores
//! it. Saved values live in an [`UndoBuffer`] owned by the caller.

use std::collections::HashMap;

/// Value written into a blanked field. A single space keeps the field from
/// being dropped on form submission, which happens to empty fields.
pub const PLACEHOLDER: &str = " ";

/// Button label while the field content is shown
pub const SHOWN_LABEL: &str = "[X]";

/// Button label while the field is blanked
pub const BLANKED_LABEL: &str = "<!>";

/// An editable text field with a stable identifier
pub trait TextField {
    fn id(&self) -> &str;
    fn value(&self) -> String;
    fn set_value(&mut self, value: &str);
}

/// In-memory text field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryField {
    id: String,
    value: String,
}

impl MemoryField {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }
}

impl TextField for MemoryField {
    fn id(&self) -> &str {
        &self.id
    }

    fn value(&self) -> String {
        self.value.clone()
    }

    fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
    }
}

/// Saved field contents keyed by field id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoBuffer {
    entries: HashMap<String, String>,
}

impl UndoBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field_id: &str) -> Option<&str> {
        self.entries.get(field_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn save(&mut self, field_id: &str, value: String) {
        self.entries.insert(field_id.to_string(), value);
    }

    fn take(&mut self, field_id: &str) -> Option<String> {
        self.entries.remove(field_id)
    }
}

/// Toggle state, mirrored by the button label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToggleState {
    #[default]
    Shown,
    Blanked,
}

impl ToggleState {
    pub fn label(&self) -> &'static str {
        match self {
            ToggleState::Shown => SHOWN_LABEL,
            ToggleState::Blanked => BLANKED_LABEL,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            SHOWN_LABEL => Some(ToggleState::Shown),
            BLANKED_LABEL => Some(ToggleState::Blanked),
            _ => None,
        }
    }
}

/// Blank/restore toggle for one field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldToggle {
    state: ToggleState,
}

impl FieldToggle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recover the toggle from its button label. Unknown labels are logged.
    pub fn from_label(label: &str) -> Option<Self> {
        match ToggleState::from_label(label) {
            Some(state) => Some(Self { state }),
            None => {
                log::warn!("Unknown toggle label '{}', ignoring click", label);
                None
            }
        }
    }

    pub fn state(&self) -> ToggleState {
        self.state
    }

    pub fn label(&self) -> &'static str {
        self.state.label()
    }

    /// Handle a click on the toggle button.
    ///
    /// Blanking saves the field content and writes the placeholder.
    /// Restoring brings the saved content back, unless the field was edited
    /// while blanked: then the edit stays in the field and replaces the
    /// saved entry. With nothing saved the placeholder is written again.
    pub fn click(&mut self, field: &mut dyn TextField, undo: &mut UndoBuffer) -> ToggleState {
        self.state = match self.state {
            ToggleState::Shown => {
                undo.save(field.id(), field.value());
                field.set_value(PLACEHOLDER);
                ToggleState::Blanked
            }
            ToggleState::Blanked => {
                let current = field.value();
                if current != PLACEHOLDER && !current.is_empty() {
                    log::debug!("Field '{}' edited while blanked, keeping edit", field.id());
                    undo.save(field.id(), current);
                } else {
                    match undo.take(field.id()) {
                        Some(saved) => field.set_value(&saved),
                        None => field.set_value(PLACEHOLDER),
                    }
                }
                ToggleState::Shown
            }
        };
        self.state
    }
}
