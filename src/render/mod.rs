//! External Engines
//!
//! Markdown rendering and math typesetting behind small traits, so the view
//! machine can be driven with real engines or test doubles.

pub mod markdown;
pub mod typeset;

pub use markdown::{ComrakRenderer, MarkdownRenderer};
pub use typeset::{CommandTypesetter, NoopTypesetter, TypesetError, Typesetter};
