//! Document discovery by filesystem walking.
//!
//! Builds the sidebar tree: every non-hidden subdirectory (even when it holds
//! no documents) and every `.md` file, sorted by name at each level.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// One entry of the document tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocEntry {
    /// File or directory name (e.g., "api.md", "guides").
    pub name: String,
    /// Path relative to the document root, `/`-separated (e.g., "guides/api.md").
    pub path: String,
    /// True for directories.
    pub is_dir: bool,
    /// Child entries (always empty for files).
    pub children: Vec<DocEntry>,
}

impl DocEntry {
    /// Whether `path` names this entry or anything below it.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.path == path || self.children.iter().any(|child| child.contains(path))
    }
}

/// Walks a root directory and builds the [`DocEntry`] tree.
pub(crate) struct Scanner {
    source_dir: PathBuf,
}

impl Scanner {
    /// Create a new Scanner rooted at `source_dir`.
    pub(crate) fn new(source_dir: PathBuf) -> Self {
        Self { source_dir }
    }

    /// Scan the filesystem and return the top-level entries.
    ///
    /// Fails if the root (or any directory below it) cannot be read.
    pub(crate) fn scan(&self) -> Result<Vec<DocEntry>, StorageError> {
        Self::scan_directory(&self.source_dir, "")
    }

    fn scan_directory(dir_path: &Path, prefix: &str) -> Result<Vec<DocEntry>, StorageError> {
        let entries = fs::read_dir(dir_path).map_err(|e| StorageError::io(e, dir_path))?;

        let mut result = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(e, dir_path))?;
            let name = entry.file_name().to_string_lossy().into_owned();

            // Skip hidden files/dirs
            if name.starts_with('.') {
                continue;
            }

            let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };

            if is_dir {
                let children = Self::scan_directory(&entry.path(), &path)?;
                result.push(DocEntry {
                    name,
                    path,
                    is_dir: true,
                    children,
                });
            } else if is_markdown(&name) {
                result.push(DocEntry {
                    name,
                    path,
                    is_dir: false,
                    children: Vec::new(),
                });
            }
        }

        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }
}

fn is_markdown(name: &str) -> bool {
    Path::new(name).extension().is_some_and(|ext| ext == "md")
}
