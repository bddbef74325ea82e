//! Home page.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;

use crate::error::ServerError;
use crate::state::AppState;
use crate::templates::{self, PageData};

/// Handle GET /.
pub(crate) async fn home(State(state): State<Arc<AppState>>) -> Result<Html<String>, ServerError> {
    let tree = state.storage.scan().map_err(ServerError::Scan)?;
    let body = templates::welcome_body(&tree);

    Ok(Html(templates::render_page(
        &PageData {
            title: "Home",
            tree: &tree,
            active: None,
            toc: &[],
            live_reload: state.live_reload,
        },
        &body,
    )))
}
