//! Registry of connected live reload sessions.
//!
//! The registry owns the outbound half of every session. A session is live
//! exactly while it is in the map; removal closes its channel.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;

use axum::extract::ws::{Message, WebSocket};
use futures_util::SinkExt;
use futures_util::stream::SplitSink;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Identity of a registered session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A message could not be delivered to a session.
#[derive(Debug, thiserror::Error)]
#[error("Failed to send to session: {source}")]
pub struct SessionError {
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl SessionError {
    /// Wrap the transport error.
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// Outbound half of a client session.
pub trait SessionSink: Send + 'static {
    /// Send a text message.
    fn send_text(&mut self, text: &str) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Close the channel. Errors are ignored.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

impl SessionSink for SplitSink<WebSocket, Message> {
    async fn send_text(&mut self, text: &str) -> Result<(), SessionError> {
        self.send(Message::Text(text.into()))
            .await
            .map_err(SessionError::new)
    }

    async fn close(&mut self) {
        let _ = SinkExt::close(self).await;
    }
}

/// Set of live sessions with fan-out broadcast.
///
/// Add, remove and broadcast serialize on one async mutex.
pub struct ConnectionRegistry<S> {
    sessions: Mutex<HashMap<SessionId, S>>,
}

impl<S: SessionSink> ConnectionRegistry<S> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Register a session and return its id.
    pub async fn add(&self, sink: S) -> SessionId {
        let id = SessionId::new();
        let total = {
            let mut sessions = self.sessions.lock().await;
            sessions.insert(id, sink);
            sessions.len()
        };
        tracing::info!(session = %id, total_clients = total, "Client connected");
        id
    }

    /// Unregister a session and close its channel.
    ///
    /// Returns `false` if the session was not registered.
    pub async fn remove(&self, id: SessionId) -> bool {
        let (removed, total) = {
            let mut sessions = self.sessions.lock().await;
            let removed = sessions.remove(&id);
            (removed, sessions.len())
        };

        let Some(mut sink) = removed else {
            return false;
        };
        sink.close().await;
        tracing::info!(session = %id, total_clients = total, "Client disconnected");
        true
    }

    /// Send `message` to every session.
    ///
    /// Sessions whose send fails are removed and closed in the same pass.
    /// Returns the number of successful deliveries.
    pub async fn broadcast(&self, message: &str) -> usize {
        let mut sessions = self.sessions.lock().await;
        let mut failed = Vec::new();
        let mut delivered = 0;

        for (id, sink) in sessions.iter_mut() {
            match sink.send_text(message).await {
                Ok(()) => delivered += 1,
                Err(err) => {
                    tracing::warn!(session = %id, error = %err, "Dropping unreachable client");
                    failed.push(*id);
                }
            }
        }

        for id in failed {
            if let Some(mut sink) = sessions.remove(&id) {
                sink.close().await;
            }
        }

        delivered
    }

    /// Remove and close every session. Returns how many were closed.
    pub async fn close_all(&self) -> usize {
        let drained: Vec<_> = self.sessions.lock().await.drain().collect();
        let count = drained.len();
        for (_, mut sink) in drained {
            sink.close().await;
        }
        count
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Whether no session is live.
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

impl<S: SessionSink> Default for ConnectionRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}
