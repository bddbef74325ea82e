//! Live reload: file watching, the session registry and the websocket endpoint.

mod coordinator;
mod registry;
mod websocket;

pub use coordinator::{RELOAD_MESSAGE, ReloadCoordinator};
pub use registry::{ConnectionRegistry, SessionError, SessionId, SessionSink};
pub use websocket::WsRegistry;
pub(crate) use websocket::ws_handler;
