//! Document views.
//!
//! `/view` renders the full page; `/api/view` returns only the rendered
//! document, which the live reload client swaps into an open page.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use md5::{Digest, Md5};
use serde::Deserialize;

use crate::error::ServerError;
use crate::state::AppState;
use crate::templates::{self, PageData};

/// Query string of both views.
#[derive(Debug, Deserialize)]
pub(crate) struct ViewQuery {
    /// Root-relative document path.
    file: Option<String>,
}

impl ViewQuery {
    fn document(&self) -> Result<&str, ServerError> {
        self.file
            .as_deref()
            .filter(|file| !file.is_empty())
            .ok_or(ServerError::MissingDocument)
    }
}

/// Handle GET /view?file=.
pub(crate) async fn view_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ViewQuery>,
) -> Result<Html<String>, ServerError> {
    let path = query.document()?;
    let markdown = state.storage.read(path)?;
    let rendered = state.renderer.render(&markdown);
    let tree = state.storage.scan().map_err(ServerError::Scan)?;

    let active = normalize(path);
    let body = templates::document_body(&rendered.html);

    Ok(Html(templates::render_page(
        &PageData {
            title: rendered.title.as_deref().unwrap_or(&active),
            tree: &tree,
            active: Some(&active),
            toc: &rendered.toc,
            live_reload: state.live_reload,
        },
        &body,
    )))
}

/// Handle GET /api/view?file=.
pub(crate) async fn view_fragment(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ViewQuery>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let path = query.document()?;
    let markdown = state.storage.read(path)?;
    let rendered = state.renderer.render(&markdown);

    let etag = compute_etag(&state.version, &rendered.html);

    // Check If-None-Match header for conditional request
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    Ok((
        [
            (header::ETAG, etag),
            (header::CACHE_CONTROL, "no-cache".to_owned()),
        ],
        Html(rendered.html),
    )
        .into_response())
}

/// Compute `ETag` from version and content.
///
/// Uses MD5 hash truncated to 64 bits (16 hex chars).
fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}

/// Drop empty and `.` segments so the path matches tree entries.
fn normalize(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_etag_includes_version() {
        assert_ne!(compute_etag("1.0.0", "content"), compute_etag("1.0.1", "content"));
    }

    #[test]
    fn test_compute_etag_includes_content() {
        assert_ne!(compute_etag("1.0.0", "content1"), compute_etag("1.0.0", "content2"));
    }

    #[test]
    fn test_compute_etag_format() {
        let etag = compute_etag("1.0.0", "content");

        assert!(etag.starts_with('"'));
        assert!(etag.ends_with('"'));
        assert_eq!(etag.len(), 18);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("./guides//intro.md"), "guides/intro.md");
        assert_eq!(normalize("a.md"), "a.md");
    }

    #[test]
    fn test_document_requires_non_empty_file() {
        let missing = ViewQuery { file: None };
        let empty = ViewQuery {
            file: Some(String::new()),
        };
        let given = ViewQuery {
            file: Some("a.md".to_owned()),
        };

        assert!(matches!(missing.document(), Err(ServerError::MissingDocument)));
        assert!(matches!(empty.document(), Err(ServerError::MissingDocument)));
        assert_eq!(given.document().unwrap(), "a.md");
    }
}
