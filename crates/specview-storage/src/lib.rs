//! Document storage and file watching for specview.
//!
//! This crate owns everything that touches the documents folder:
//!
//! - [`FsStorage`] lists the document tree and reads single documents,
//!   refusing paths that leave the folder
//! - [`FileWatcher`] watches the folder recursively and yields
//!   [`ChangeEvent`]s, registering directories created while it runs
//!
//! # Example
//!
//! ```ignore
//! use specview_storage::FileWatcher;
//!
//! let mut watcher = FileWatcher::new("specs")?;
//! while let Some(change) = watcher.recv().await {
//!     println!("{:?}", change?);
//! }
//! ```

mod error;
mod event;
mod fs;
mod scanner;
mod watcher;

pub use error::{StorageError, StorageErrorKind};
pub use event::{ChangeEvent, ChangeKind};
pub use fs::FsStorage;
pub use scanner::DocEntry;
pub use watcher::{FileWatcher, WatchError};
