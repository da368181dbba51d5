//! View Elements
//!
//! The page pieces a view is made of: a clickable activator and a display
//! surface. The machine only needs these capabilities, not a DOM.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed set of views a page can offer
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    /// The editable source text
    Raw,
    /// Source rendered as markdown with typeset math
    Markdown,
    /// Source shown as plain text
    Plain,
}

impl ViewKind {
    pub const ALL: [ViewKind; 3] = [ViewKind::Raw, ViewKind::Markdown, ViewKind::Plain];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::Raw => "raw",
            ViewKind::Markdown => "markdown",
            ViewKind::Plain => "plain",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tab-like control that marks a view as selected
pub trait Activator {
    fn set_active(&mut self, active: bool);
    fn is_active(&self) -> bool;
}

/// Container that displays a view's content
pub trait Surface {
    fn set_visible(&mut self, visible: bool);
    fn is_visible(&self) -> bool;

    /// Current text content
    fn text(&self) -> String;

    /// Replace the whole content
    fn replace_content(&mut self, content: String);
}

/// In-memory activator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryActivator {
    active: bool,
}

impl MemoryActivator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Activator for MemoryActivator {
    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// In-memory surface, used by the CLI and tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySurface {
    visible: bool,
    content: String,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            visible: false,
            content: content.into(),
        }
    }
}

impl Surface for MemorySurface {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn text(&self) -> String {
        self.content.clone()
    }

    fn replace_content(&mut self, content: String) {
        self.content = content;
    }
}
