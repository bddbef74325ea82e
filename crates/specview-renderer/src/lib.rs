//! Markdown rendering for specview.
//!
//! [`MarkdownRenderer`] turns a markdown document into HTML and collects a
//! table of contents. Every heading gets a slug id that is unique within the
//! document, so TOC links can point at it.
//!
//! # Example
//!
//! ```
//! use specview_renderer::MarkdownRenderer;
//!
//! let result = MarkdownRenderer::new().render("# Hello\n\n## Usage");
//! assert_eq!(result.title.as_deref(), Some("Hello"));
//! assert_eq!(result.toc[1].id, "usage");
//! ```

mod renderer;
mod slug;

pub use renderer::{MarkdownRenderer, RenderResult, TocEntry};
pub use slug::slugify;

/// Escape text for use in HTML content and attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
