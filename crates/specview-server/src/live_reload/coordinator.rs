//! Glue between the file watcher and the session registry.

use std::sync::Arc;

use specview_storage::FileWatcher;
use tokio_util::sync::CancellationToken;

use super::registry::{ConnectionRegistry, SessionSink};

/// Text message sent to every session when a watched file changes.
pub const RELOAD_MESSAGE: &str = "reload";

/// Forwards file changes to connected sessions as reload messages.
///
/// Owns the watcher. Every change yields one broadcast; there is no
/// debouncing.
pub struct ReloadCoordinator<S> {
    watcher: FileWatcher,
    registry: Arc<ConnectionRegistry<S>>,
}

impl<S: SessionSink> ReloadCoordinator<S> {
    /// Create a coordinator for an already started watcher.
    #[must_use]
    pub fn new(watcher: FileWatcher, registry: Arc<ConnectionRegistry<S>>) -> Self {
        Self { watcher, registry }
    }

    /// Run until `cancel` fires or the watcher stream ends.
    ///
    /// On exit the watcher is dropped, releasing its OS handles, and all
    /// sessions are closed.
    pub async fn run(self, cancel: CancellationToken) {
        let Self {
            mut watcher,
            registry,
        } = self;
        let root = watcher.root().to_path_buf();

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => break,
                next = watcher.recv() => match next {
                    Some(Ok(change)) => {
                        let delivered = registry.broadcast(RELOAD_MESSAGE).await;
                        tracing::info!(
                            path = %change.relative_to(&root).display(),
                            kind = ?change.kind,
                            clients = delivered,
                            "File changed, reload sent"
                        );
                    }
                    Some(Err(err)) => {
                        tracing::error!(error = %err, "File watcher error");
                    }
                    None => {
                        tracing::warn!("File watcher stream ended");
                        break;
                    }
                },
            }
        }

        drop(watcher);
        let closed = registry.close_all().await;
        tracing::debug!(sessions = closed, "Live reload stopped");
    }
}
