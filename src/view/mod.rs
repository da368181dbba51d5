//! View Switching
//!
//! Raw, rendered-markdown and plain-text views over the same source text.

pub mod machine;
pub mod surface;

pub use machine::{
    Activation, TypesetOutcome, TypesetTicket, View, ViewError, ViewState, ViewStateMachine,
    ViewStateMachineBuilder,
};
pub use surface::{Activator, MemoryActivator, MemorySurface, Surface, ViewKind};

use crate::render::MarkdownRenderer;

/// Build a machine backed by in-memory elements for the given views.
///
/// The raw and plain surfaces start out holding `source`.
pub fn headless_machine(
    kinds: &[ViewKind],
    renderer: impl MarkdownRenderer + 'static,
    escape_math: bool,
    initial_view: Option<ViewKind>,
    source: &str,
) -> Result<ViewStateMachine, ViewError> {
    let mut builder = ViewStateMachine::builder(renderer)
        .escape_math(escape_math)
        .initial_view(initial_view);

    for kind in kinds {
        let surface = match kind {
            ViewKind::Raw | ViewKind::Plain => MemorySurface::with_content(source),
            ViewKind::Markdown => MemorySurface::new(),
        };
        builder = builder.view(*kind, MemoryActivator::new(), surface);
    }

    builder.build()
}
