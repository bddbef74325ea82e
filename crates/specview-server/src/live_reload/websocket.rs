//! WebSocket endpoint for live reload sessions.
//!
//! Each upgraded connection is split: the outbound half is handed to the
//! registry, the inbound half is read only to notice when the client goes
//! away.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::StreamExt;
use futures_util::stream::SplitSink;

use super::registry::{ConnectionRegistry, SessionId};

/// Registry of websocket sessions.
pub type WsRegistry = ConnectionRegistry<SplitSink<WebSocket, Message>>;

/// Handle WebSocket upgrade for live reload.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(registry): State<Arc<WsRegistry>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, registry))
}

/// Removes the session when the connection task ends, however it ends.
struct SessionGuard {
    id: SessionId,
    registry: Arc<WsRegistry>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let id = self.id;
        let registry = Arc::clone(&self.registry);
        // Runtime is gone during process teardown; nothing left to clean up then
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                registry.remove(id).await;
            });
        }
    }
}

/// Handle an established WebSocket connection.
async fn handle_socket(socket: WebSocket, registry: Arc<WsRegistry>) {
    let (sink, mut stream) = socket.split();
    let id = registry.add(sink).await;
    let _guard = SessionGuard { id, registry };

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(session = %id, error = %err, "WebSocket receive failed");
                break;
            }
        }
    }
}
