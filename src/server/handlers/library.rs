//! Archive-root mount
//!
//! Serves the archive root's own files under `/library`. The directory is
//! resolved from preferences on every request, so once a base-path restart
//! has completed this mount serves the new root without re-registration.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use super::AppState;

const MOUNT_PREFIX: &str = "/library";

/// `GET /library/*` — one-shot a `ServeDir` rooted at the current archive
/// root, with the mount prefix stripped off the request path.
pub async fn library_asset(State(state): State<AppState>, mut req: Request<Body>) -> Response {
    let path = req.uri().path();
    let stripped = path.strip_prefix(MOUNT_PREFIX).unwrap_or(path);
    let stripped = if stripped.is_empty() { "/" } else { stripped };

    let rewritten = match req.uri().query() {
        Some(query) => format!("{stripped}?{query}"),
        None => stripped.to_string(),
    };
    let uri: Uri = match rewritten.parse() {
        Ok(uri) => uri,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    *req.uri_mut() = uri;

    match ServeDir::new(state.prefs.base_path()).oneshot(req).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}
