//! Static asset serving below `/public/`.
//!
//! Assets come from `specview-assets`. Directory-style paths are never
//! listed.

use axum::extract::Path;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::handlers::not_found::not_found;

/// Handle GET /public/{*path}.
pub(crate) async fn serve_public(Path(path): Path<String>) -> Response {
    if path.is_empty() || path.ends_with('/') {
        return not_found().await.into_response();
    }

    match specview_assets::get(&path) {
        Some(content) => (
            [(header::CONTENT_TYPE, specview_assets::mime_for(&path))],
            content.into_owned(),
        )
            .into_response(),
        None => not_found().await.into_response(),
    }
}
