//! Change event types produced by [`FileWatcher`](crate::FileWatcher).

use std::path::{Path, PathBuf};

/// Kind of filesystem change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    /// File or directory was created (or renamed into place).
    Created,
    /// File content was written.
    Modified,
    /// File or directory was removed (or renamed away).
    Removed,
}

/// A single filesystem change below the watched root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Path as reported by the watcher (the watched root joined with the entry).
    pub path: PathBuf,
    /// Kind of change.
    pub kind: ChangeKind,
}

impl ChangeEvent {
    /// Path relative to `root`, or the full path when it lies outside it.
    #[must_use]
    pub fn relative_to<'a>(&'a self, root: &Path) -> &'a Path {
        self.path.strip_prefix(root).unwrap_or(&self.path)
    }
}
