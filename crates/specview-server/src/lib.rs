//! HTTP server for specview.
//!
//! Serves a folder of markdown documents as a small website and pushes
//! `reload` messages to every open page when a file in the folder changes:
//! - `/` and `/view?file=` render pages with the document tree sidebar
//! - `/api/view?file=` returns just the rendered document
//! - `/public/*` serves the embedded stylesheet and live reload client
//! - `/ws` accepts live reload sessions
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use specview_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         source_dir: PathBuf::from("specs"),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! FileWatcher ──ChangeEvent──► ReloadCoordinator ──"reload"──► ConnectionRegistry
//!                                                                  │
//! Browser ◄──────────────────── websocket sessions ◄───────────────┘
//!    │
//!    └──HTTP──► axum router ──► FsStorage + MarkdownRenderer + templates
//! ```

mod app;
mod error;
mod handlers;
mod live_reload;
mod middleware;
mod state;
mod static_files;
mod templates;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use specview_renderer::MarkdownRenderer;
use specview_storage::{FileWatcher, FsStorage};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use error::ServerError;
pub use live_reload::{
    ConnectionRegistry, RELOAD_MESSAGE, ReloadCoordinator, SessionError, SessionId, SessionSink,
    WsRegistry,
};

use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Documents folder.
    pub source_dir: PathBuf,
    /// Enable live reload.
    pub live_reload_enabled: bool,
    /// How long open connections may take to finish after shutdown starts.
    pub shutdown_grace: Duration,
    /// Application version (for `ETag`s).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 9091,
            source_dir: PathBuf::from("specs"),
            live_reload_enabled: true,
            shutdown_grace: Duration::from_secs(5),
            version: String::new(),
        }
    }
}

/// Create server configuration from the loaded config file.
#[must_use]
pub fn server_config_from_config(config: &specview_config::Config, version: String) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        source_dir: config.docs_resolved.source_dir.clone(),
        live_reload_enabled: config.live_reload.enabled,
        shutdown_grace: config.server.shutdown_grace(),
        version,
    }
}

/// Bind the configured address and serve until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or [`serve`] fails.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|source| ServerError::Bind {
            address: format!("{}:{}", config.host, config.port),
            source,
        })?;

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel.clone()));

    serve(listener, config, cancel).await
}

/// Serve on `listener` until `cancel` fires.
///
/// The documents folder is checked and, with live reload enabled, the file
/// watcher started before the first request is accepted. After cancellation,
/// open connections get `config.shutdown_grace` to finish before they are
/// dropped.
///
/// # Errors
///
/// Returns an error if the folder cannot be listed, the watcher cannot be
/// started, or the server fails while running.
pub async fn serve(
    listener: TcpListener,
    config: ServerConfig,
    cancel: CancellationToken,
) -> Result<(), ServerError> {
    serve_with_registry(listener, config, Arc::new(WsRegistry::new()), cancel).await
}

/// Like [`serve`], registering live reload sessions in `registry`.
///
/// # Errors
///
/// Same as [`serve`].
pub async fn serve_with_registry(
    listener: TcpListener,
    config: ServerConfig,
    registry: Arc<WsRegistry>,
    cancel: CancellationToken,
) -> Result<(), ServerError> {
    let storage = FsStorage::new(config.source_dir.clone());
    storage.scan().map_err(ServerError::Scan)?;

    let coordinator = if config.live_reload_enabled {
        let watcher = FileWatcher::new(&config.source_dir)?;
        let coordinator = ReloadCoordinator::new(watcher, Arc::clone(&registry));
        Some(tokio::spawn(coordinator.run(cancel.clone())))
    } else {
        None
    };

    let state = Arc::new(AppState {
        storage,
        renderer: MarkdownRenderer::new(),
        live_reload: config.live_reload_enabled,
        version: config.version.clone(),
    });
    let app = app::create_router(state, config.live_reload_enabled.then_some(registry));

    tracing::info!(
        address = %listener.local_addr()?,
        folder = %config.source_dir.display(),
        live_reload = config.live_reload_enabled,
        "Server listening"
    );

    let shutdown = cancel.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
    });

    let outcome = tokio::select! {
        joined = &mut server => joined,
        () = cancel.cancelled() => {
            if let Ok(joined) = tokio::time::timeout(config.shutdown_grace, &mut server).await {
                joined
            } else {
                tracing::warn!(
                    grace_secs = config.shutdown_grace.as_secs(),
                    "Connections still open after grace period, aborting"
                );
                server.abort();
                Ok(Ok(()))
            }
        }
    };

    // Stops the coordinator when the server ended on its own
    cancel.cancel();
    if let Some(task) = coordinator
        && tokio::time::timeout(config.shutdown_grace, task).await.is_err()
    {
        tracing::warn!("Live reload did not stop within the grace period");
    }

    outcome.map_err(std::io::Error::other)??;
    tracing::info!("Server stopped");
    Ok(())
}

/// Cancel `cancel` on Ctrl+C or SIGTERM.
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
        () = cancel.cancelled() => return,
    }

    tracing::info!("Shutdown signal received, stopping server...");
    cancel.cancel();
}
