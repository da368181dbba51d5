//! Markdown Rendering
//!
//! HTML generation is delegated to comrak.

use comrak::{markdown_to_html, ComrakOptions};

/// Turns prepared markdown into HTML. Rendering is synchronous and total.
pub trait MarkdownRenderer {
    fn render(&self, markdown: &str) -> String;
}

/// Renderer backed by comrak with GitHub-style extensions
#[derive(Debug, Clone, Copy, Default)]
pub struct ComrakRenderer {
    allow_raw_html: bool,
}

impl ComrakRenderer {
    /// Create a renderer. Raw HTML in the source is omitted from the output
    /// unless `allow_raw_html` is set.
    pub fn new(allow_raw_html: bool) -> Self {
        Self { allow_raw_html }
    }

    pub fn allows_raw_html(&self) -> bool {
        self.allow_raw_html
    }

    fn options(&self) -> ComrakOptions<'static> {
        let mut options = ComrakOptions::default();
        options.extension.table = true;
        options.extension.strikethrough = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;
        options.render.unsafe_ = self.allow_raw_html;
        options
    }
}

impl MarkdownRenderer for ComrakRenderer {
    fn render(&self, markdown: &str) -> String {
        markdown_to_html(markdown, &self.options())
    }
}
