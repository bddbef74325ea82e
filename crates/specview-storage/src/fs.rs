//! Filesystem document storage.
//!
//! Provides [`FsStorage`] for listing and reading documents below a root
//! directory. Document paths arrive from HTTP query strings, so every read is
//! validated to stay inside the root.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::StorageError;
use crate::scanner::{DocEntry, Scanner};

/// Filesystem storage rooted at a documents folder.
///
/// # Example
///
/// ```ignore
/// use std::path::PathBuf;
/// use specview_storage::FsStorage;
///
/// let storage = FsStorage::new(PathBuf::from("specs"));
/// let tree = storage.scan()?;
/// let markdown = storage.read("guides/intro.md")?;
/// ```
#[derive(Clone, Debug)]
pub struct FsStorage {
    source_dir: PathBuf,
}

impl FsStorage {
    /// Create a new filesystem storage.
    #[must_use]
    pub fn new(source_dir: PathBuf) -> Self {
        Self { source_dir }
    }

    /// Root directory of the documents.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Build the document tree.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the root or one of its subdirectories
    /// cannot be read.
    pub fn scan(&self) -> Result<Vec<DocEntry>, StorageError> {
        Scanner::new(self.source_dir.clone()).scan()
    }

    /// Read a document by its root-relative path.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidPath` error for paths that would escape the root,
    /// otherwise maps the underlying I/O error.
    pub fn read(&self, path: &str) -> Result<String, StorageError> {
        let full_path = self.resolve(path)?;
        fs::read_to_string(&full_path).map_err(|e| StorageError::io(e, full_path))
    }

    /// Map a root-relative path to a filesystem path.
    ///
    /// Rejects empty paths, absolute paths and any `..` component.
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        let mut normal = 0usize;
        for component in relative.components() {
            match component {
                Component::Normal(_) => normal += 1,
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(StorageError::invalid_path(relative));
                }
            }
        }
        if normal == 0 {
            return Err(StorageError::invalid_path(relative));
        }
        Ok(self.source_dir.join(relative))
    }
}
