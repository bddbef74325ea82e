//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use specview_storage::{StorageError, StorageErrorKind, WatchError};

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Request did not name a document.
    #[error("No document specified")]
    MissingDocument,

    /// Reading a document failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Listing the document tree failed.
    #[error("Failed to list documents: {0}")]
    Scan(#[source] StorageError),

    /// The file watcher could not be started.
    #[error(transparent)]
    Watch(#[from] WatchError),

    /// The listen address could not be bound.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        /// Requested `host:port`.
        address: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match &self {
            Self::MissingDocument => {
                tracing::info!("No document specified, redirecting home");
                Redirect::to("/").into_response()
            }
            Self::Storage(err)
                if matches!(
                    err.kind(),
                    StorageErrorKind::NotFound | StorageErrorKind::InvalidPath
                ) =>
            {
                tracing::info!(error = %err, "Document unavailable, redirecting home");
                Redirect::to("/").into_response()
            }
            Self::Storage(err) => {
                tracing::error!(error = %err, "Failed to read document");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read file").into_response()
            }
            _ => {
                tracing::error!(error = %self, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
