//! mdtabs
//!
//! Headless view switching for a markdown authoring page.
//!
//! This library provides:
//! - Conversion of the `||a||b||` table dialect into markdown tables
//! - Math delimiter escaping ahead of markdown rendering
//! - A view state machine over raw, rendered-markdown and plain views
//! - Field blank/restore toggles and a form submission guard
//! - Configuration management and a command-line driver

pub mod cli;
pub mod config;
pub mod convert;
pub mod page;
pub mod render;
pub mod view;

// Re-exports for the public API
pub use config::Config;
pub use convert::{convert, escape_math_delimiters, prepare_markdown};
pub use render::{ComrakRenderer, MarkdownRenderer, TypesetError, Typesetter};
pub use view::{Activation, ViewError, ViewKind, ViewStateMachine};
