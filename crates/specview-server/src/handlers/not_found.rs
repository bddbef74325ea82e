//! Fallback for unknown routes.

use axum::http::StatusCode;
use axum::response::Html;

use crate::templates;

/// Render the 404 page.
pub(crate) async fn not_found() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html(templates::not_found_page()))
}
