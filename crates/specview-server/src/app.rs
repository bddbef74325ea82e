//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::live_reload::{self, WsRegistry};
use crate::middleware::security;
use crate::state::AppState;
use crate::static_files;

/// Create the application router.
///
/// The `/ws` route exists only when a session registry is given.
pub(crate) fn create_router(state: Arc<AppState>, registry: Option<Arc<WsRegistry>>) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::home::home))
        .route("/view", get(handlers::view::view_page))
        .route("/api/view", get(handlers::view::view_fragment))
        .route("/public/{*path}", get(static_files::serve_public))
        .fallback(handlers::not_found::not_found)
        .with_state(state);

    if let Some(registry) = registry {
        router = router.merge(
            Router::new()
                .route("/ws", get(live_reload::ws_handler))
                .with_state(registry),
        );
    }

    security::with_security_headers(router).layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use specview_renderer::MarkdownRenderer;
    use specview_storage::FsStorage;
    use tower::ServiceExt;

    use super::*;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "# Alpha\n\n## Details\n\nBody text").unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b.md"), "# Beta").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        dir
    }

    fn router(dir: &tempfile::TempDir, live_reload: bool) -> Router {
        let state = Arc::new(AppState {
            storage: FsStorage::new(dir.path().to_path_buf()),
            renderer: MarkdownRenderer::new(),
            live_reload,
            version: "test".to_owned(),
        });
        let registry = live_reload.then(|| Arc::new(WsRegistry::new()));
        create_router(state, registry)
    }

    async fn get(router: Router, uri: &str) -> Response {
        router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn header_value<'a>(response: &'a Response, name: header::HeaderName) -> Option<&'a str> {
        response.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[tokio::test]
    async fn test_home_lists_documents() {
        let dir = fixture();
        let response = get(router(&dir, false), "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("/view?file=a.md"));
        assert!(html.contains("/view?file=sub/b.md"));
        assert!(!html.contains("notes.txt"));
        assert!(html.contains("2 documents"));
    }

    #[tokio::test]
    async fn test_home_fails_for_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(AppState {
            storage: FsStorage::new(dir.path().join("missing")),
            renderer: MarkdownRenderer::new(),
            live_reload: false,
            version: "test".to_owned(),
        });
        let response = get(create_router(state, None), "/").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_view_renders_full_page() {
        let dir = fixture();
        let response = get(router(&dir, false), "/view?file=a.md").await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("<title>Alpha - specview</title>"));
        assert!(html.contains("id=\"spec-content\""));
        assert!(html.contains("<h2 id=\"details\">Details</h2>"));
        assert!(html.contains("<a href=\"#details\">Details</a>"));
        assert!(html.contains("class=\"active\">a.md</a>"));
    }

    #[tokio::test]
    async fn test_view_nested_document_opens_directory() {
        let dir = fixture();
        let html = body_text(get(router(&dir, false), "/view?file=sub/b.md").await).await;

        assert!(html.contains("<details open>"));
        assert!(html.contains("class=\"active\">b.md</a>"));
    }

    #[tokio::test]
    async fn test_view_redirects_home_when_unavailable() {
        let dir = fixture();

        for uri in [
            "/view",
            "/view?file=",
            "/view?file=missing.md",
            "/view?file=../etc/passwd",
            "/view?file=%2Fetc%2Fpasswd",
            "/api/view",
            "/api/view?file=sub/../../a.md",
        ] {
            let response = get(router(&dir, false), uri).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "uri: {uri}");
            assert_eq!(header_value(&response, header::LOCATION), Some("/"), "uri: {uri}");
        }
    }

    #[tokio::test]
    async fn test_view_of_directory_is_internal_error() {
        let dir = fixture();
        let response = get(router(&dir, false), "/view?file=sub").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_api_view_returns_fragment_with_etag() {
        let dir = fixture();
        let response = get(router(&dir, false), "/api/view?file=a.md").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(header_value(&response, header::ETAG).is_some());
        assert_eq!(
            header_value(&response, header::CONTENT_TYPE),
            Some("text/html; charset=utf-8")
        );
        let html = body_text(response).await;
        assert!(html.starts_with("<h1 id=\"alpha\">Alpha</h1>"));
        assert!(!html.contains("<html"));
    }

    #[tokio::test]
    async fn test_api_view_honors_if_none_match() {
        let dir = fixture();
        let first = get(router(&dir, false), "/api/view?file=a.md").await;
        let etag = header_value(&first, header::ETAG).unwrap().to_owned();

        let request = Request::get("/api/view?file=a.md")
            .header(header::IF_NONE_MATCH, &etag)
            .body(Body::empty())
            .unwrap();
        let response = router(&dir, false).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);

        fs::write(dir.path().join("a.md"), "# Alpha v2").unwrap();
        let request = Request::get("/api/view?file=a.md")
            .header(header::IF_NONE_MATCH, &etag)
            .body(Body::empty())
            .unwrap();
        let response = router(&dir, false).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_public_assets() {
        let dir = fixture();

        let response = get(router(&dir, false), "/public/js/live-reload.js").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            header_value(&response, header::CONTENT_TYPE),
            Some("text/javascript")
        );

        let response = get(router(&dir, false), "/public/css/style.css").await;
        assert_eq!(response.status(), StatusCode::OK);

        for uri in ["/public/js/theme.js", "/public/js/comments.js"] {
            let response = get(router(&dir, false), uri).await;
            assert_eq!(response.status(), StatusCode::OK, "uri: {uri}");
        }
    }

    #[tokio::test]
    async fn test_view_includes_comments_and_theme() {
        let dir = fixture();
        let html = body_text(get(router(&dir, false), "/view?file=a.md").await).await;

        assert!(html.contains("/public/js/theme.js"));
        assert!(html.contains("/public/js/comments.js"));
        assert!(html.contains("id=\"copy-comments\""));

        let home = body_text(get(router(&dir, false), "/").await).await;
        assert!(home.contains("/public/js/theme.js"));
        assert!(!home.contains("/public/js/comments.js"));
    }

    #[tokio::test]
    async fn test_public_directory_paths_are_not_found() {
        let dir = fixture();

        for uri in ["/public/", "/public/js/", "/public/missing.js"] {
            let response = get(router(&dir, false), uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri: {uri}");
        }
    }

    #[tokio::test]
    async fn test_unknown_route_renders_not_found_page() {
        let dir = fixture();
        let response = get(router(&dir, false), "/does/not/exist").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("Page not found"));
    }

    #[tokio::test]
    async fn test_security_headers_on_every_response() {
        let dir = fixture();

        for uri in ["/", "/view?file=a.md", "/public/css/style.css", "/nope"] {
            let response = get(router(&dir, false), uri).await;
            assert_eq!(header_value(&response, header::X_FRAME_OPTIONS), Some("DENY"));
            assert_eq!(
                header_value(&response, header::X_CONTENT_TYPE_OPTIONS),
                Some("nosniff")
            );
            assert!(
                header_value(&response, header::CONTENT_SECURITY_POLICY)
                    .is_some_and(|csp| csp.contains("connect-src 'self' ws: wss:"))
            );
        }
    }

    #[tokio::test]
    async fn test_live_reload_script_follows_setting() {
        let dir = fixture();

        let html = body_text(get(router(&dir, true), "/view?file=a.md").await).await;
        assert!(html.contains("/public/js/live-reload.js"));

        let html = body_text(get(router(&dir, false), "/view?file=a.md").await).await;
        assert!(!html.contains("/public/js/live-reload.js"));
    }

    #[tokio::test]
    async fn test_ws_route_absent_without_live_reload() {
        let dir = fixture();
        let response = get(router(&dir, false), "/ws").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
