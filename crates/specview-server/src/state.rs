//! Application state.
//!
//! Shared state for all request handlers.

use specview_renderer::MarkdownRenderer;
use specview_storage::FsStorage;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Documents folder.
    pub(crate) storage: FsStorage,
    /// Markdown renderer.
    pub(crate) renderer: MarkdownRenderer,
    /// Whether pages load the live reload client.
    pub(crate) live_reload: bool,
    /// Application version, mixed into `ETag`s.
    pub(crate) version: String,
}
