//! End-to-end live reload over real sockets.

use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use specview_server::{ServerConfig, ServerError, WsRegistry, serve, serve_with_registry};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

type Client = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

struct TestServer {
    addr: SocketAddr,
    registry: Arc<WsRegistry>,
    cancel: CancellationToken,
    task: JoinHandle<Result<(), ServerError>>,
    dir: tempfile::TempDir,
}

async fn start(live_reload_enabled: bool) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.md"), "# A").unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();
    let config = ServerConfig {
        port: addr.port(),
        source_dir: dir.path().to_path_buf(),
        live_reload_enabled,
        shutdown_grace: Duration::from_secs(2),
        ..ServerConfig::default()
    };
    let registry = Arc::new(WsRegistry::new());
    let task = tokio::spawn(serve_with_registry(
        listener,
        config,
        Arc::clone(&registry),
        cancel.clone(),
    ));

    TestServer {
        addr,
        registry,
        cancel,
        task,
        dir,
    }
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _response) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .unwrap();
    client
}

/// Wait until exactly `expected` sessions are registered.
async fn wait_for_sessions(registry: &WsRegistry, expected: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while registry.len().await != expected {
        assert!(
            tokio::time::Instant::now() < deadline,
            "expected {expected} sessions, have {}",
            registry.len().await
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Next text message, skipping control frames.
async fn next_text(client: &mut Client) -> Option<String> {
    while let Some(message) = client.next().await {
        match message {
            Ok(Message::Text(text)) => return Some(text.as_str().to_owned()),
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => {}
        }
    }
    None
}

#[tokio::test]
async fn test_write_reaches_every_session() {
    let server = start(true).await;
    let mut first = connect(server.addr).await;
    let mut second = connect(server.addr).await;
    wait_for_sessions(&server.registry, 2).await;

    fs::write(server.dir.path().join("a.md"), "# A, edited").unwrap();

    let deadline = Duration::from_secs(2);
    let first_message = tokio::time::timeout(deadline, next_text(&mut first)).await;
    let second_message = tokio::time::timeout(deadline, next_text(&mut second)).await;
    assert_eq!(first_message.unwrap().as_deref(), Some("reload"));
    assert_eq!(second_message.unwrap().as_deref(), Some("reload"));

    server.cancel.cancel();
    server.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_disconnected_session_does_not_block_others() {
    let server = start(true).await;
    let mut stays = connect(server.addr).await;
    let mut leaves = connect(server.addr).await;
    wait_for_sessions(&server.registry, 2).await;

    leaves.close(None).await.unwrap();
    drop(leaves);
    wait_for_sessions(&server.registry, 1).await;

    fs::write(server.dir.path().join("a.md"), "# A, again").unwrap();

    let message = tokio::time::timeout(Duration::from_secs(2), next_text(&mut stays)).await;
    assert_eq!(message.unwrap().as_deref(), Some("reload"));
    assert_eq!(server.registry.len().await, 1);

    server.cancel.cancel();
    server.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_shutdown_closes_sessions() {
    let server = start(true).await;
    let mut client = connect(server.addr).await;
    wait_for_sessions(&server.registry, 1).await;

    server.cancel.cancel();

    let closed = tokio::time::timeout(Duration::from_secs(5), next_text(&mut client)).await;
    assert_eq!(closed.unwrap(), None);

    let stopped = tokio::time::timeout(Duration::from_secs(5), server.task).await;
    stopped.unwrap().unwrap().unwrap();
    assert!(server.registry.is_empty().await);
}

#[tokio::test]
async fn test_ws_unavailable_without_live_reload() {
    let server = start(false).await;

    let result = tokio_tungstenite::connect_async(format!("ws://{}/ws", server.addr)).await;
    assert!(result.is_err());

    server.cancel.cancel();
    server.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_serve_fails_for_missing_folder() {
    let dir = tempfile::tempdir().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let config = ServerConfig {
        source_dir: dir.path().join("missing"),
        ..ServerConfig::default()
    };

    let result = serve(listener, config, CancellationToken::new()).await;

    assert!(matches!(result, Err(ServerError::Scan(_))));
}
