//! Recursive file watcher with a growing watch set.
//!
//! Every directory below the root is registered individually (non-recursive
//! watches). Directories created while running are registered as soon as their
//! creation is observed, so files written into them are seen too. The watch
//! set never shrinks; the backend drops watches of removed directories by
//! itself.
//!
//! Events are not debounced: each low-level write, create or remove yields
//! exactly one [`ChangeEvent`].

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::event::{ChangeEvent, ChangeKind};

/// File watcher error.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// A directory could not be listed while registering watches.
    #[error("Failed to read directory {}: {source}", path.display())]
    Walk {
        /// Directory that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Error reported by the notify backend.
    #[error("File watcher error: {0}")]
    Notify(#[from] notify::Error),
}

/// Watches a directory tree and yields [`ChangeEvent`]s.
///
/// Dropping the watcher releases all OS watch handles.
pub struct FileWatcher {
    events: mpsc::UnboundedReceiver<notify::Result<Event>>,
    watcher: RecommendedWatcher,
    root: PathBuf,
    watch_set: HashSet<PathBuf>,
}

impl FileWatcher {
    /// Create a watcher and register every directory below `root`.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Walk`] if the root or any directory below it
    /// cannot be listed, and [`WatchError::Notify`] if the backend cannot be
    /// created or refuses a watch.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, WatchError> {
        let root = root.into();
        // Unbounded: the backend thread must never wait on the consumer, which
        // itself waits on the backend thread whenever it adds a watch.
        let (tx, events) = mpsc::unbounded_channel();

        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        })?;

        let mut dirs = Vec::new();
        collect_dirs(&root, &mut dirs)?;

        let mut file_watcher = Self {
            events,
            watcher,
            root,
            watch_set: HashSet::new(),
        };
        for dir in &dirs {
            file_watcher.watch_dir(dir)?;
        }

        tracing::debug!(
            root = %file_watcher.root.display(),
            directories = file_watcher.watch_set.len(),
            "File watcher started"
        );

        Ok(file_watcher)
    }

    /// Root directory being watched.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `dir` is part of the watch set.
    #[must_use]
    pub fn is_watching(&self, dir: &Path) -> bool {
        self.watch_set.contains(dir)
    }

    /// Number of directories in the watch set.
    #[must_use]
    pub fn watched_count(&self) -> usize {
        self.watch_set.len()
    }

    /// Wait for the next change.
    ///
    /// Backend errors are returned as `Some(Err(_))` and do not end the
    /// stream. Returns `None` once the backend channel is closed.
    ///
    /// A change whose new directory is still being registered is lost if
    /// this future is dropped.
    pub async fn recv(&mut self) -> Option<Result<ChangeEvent, WatchError>> {
        loop {
            let event = match self.events.recv().await? {
                Ok(event) => event,
                Err(err) => return Some(Err(WatchError::Notify(err))),
            };

            if let Some(change) = self.handle_event(&event).await {
                return Some(Ok(change));
            }
        }
    }

    /// Turn one backend notification into at most one change.
    ///
    /// Created directories are added to the watch set before returning.
    async fn handle_event(&mut self, event: &Event) -> Option<ChangeEvent> {
        let (kind, path) = classify(event)?;

        if kind == ChangeKind::Created {
            let created = path.clone();
            match tokio::task::spawn_blocking(move || created_dirs(&created)).await {
                Ok(dirs) => self.watch_new_dirs(&dirs),
                Err(err) => tracing::warn!(error = %err, "Directory listing task failed"),
            }
        }

        Some(ChangeEvent { path, kind })
    }

    /// Register directories found below a created path. Failures are logged.
    fn watch_new_dirs(&mut self, dirs: &[PathBuf]) {
        for dir in dirs {
            match self.watch_dir(dir) {
                Ok(()) => tracing::info!(path = %dir.display(), "Watching new directory"),
                Err(err) => {
                    tracing::warn!(path = %dir.display(), error = %err, "Failed to watch new directory");
                }
            }
        }
    }

    /// Add a single directory to the backend and the watch set.
    ///
    /// Always hands the path to the backend, even when it is already in the
    /// set: a directory removed and re-created at the same path needs a new
    /// OS watch.
    fn watch_dir(&mut self, dir: &Path) -> Result<(), notify::Error> {
        self.watcher.watch(dir, RecursiveMode::NonRecursive)?;
        self.watch_set.insert(dir.to_path_buf());
        Ok(())
    }
}

/// Directories to register for a newly created path: the path itself and
/// everything below it, or nothing if it is not a directory.
///
/// Blocking; runs on the blocking pool.
fn created_dirs(path: &Path) -> Vec<PathBuf> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Vec::new(),
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "Could not stat created path");
            return Vec::new();
        }
    }

    let mut dirs = Vec::new();
    if let Err(err) = collect_dirs(path, &mut dirs) {
        tracing::warn!(error = %err, "Failed to list new directory");
    }
    dirs
}

/// Map a backend event to a change kind and the path it applies to.
///
/// Renames count as a removal of the source and a creation of the
/// destination. Metadata-only and access notifications are ignored.
fn classify(event: &Event) -> Option<(ChangeKind, PathBuf)> {
    let kind = match event.kind {
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Both)) => {
            ChangeKind::Created
        }
        EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            ChangeKind::Removed
        }
        EventKind::Modify(ModifyKind::Metadata(_)) => return None,
        EventKind::Modify(_) => ChangeKind::Modified,
        EventKind::Access(_) | EventKind::Any | EventKind::Other => return None,
    };

    // For two-path renames the destination comes last
    let path = event.paths.last()?.clone();
    Some((kind, path))
}

/// Collect `dir` and every directory below it.
fn collect_dirs(dir: &Path, dirs: &mut Vec<PathBuf>) -> Result<(), WatchError> {
    let walk_error = |source| WatchError::Walk {
        path: dir.to_path_buf(),
        source,
    };

    let entries = fs::read_dir(dir).map_err(walk_error)?;
    dirs.push(dir.to_path_buf());

    for entry in entries {
        let entry = entry.map_err(walk_error)?;
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            collect_dirs(&entry.path(), dirs)?;
        }
    }

    Ok(())
}
