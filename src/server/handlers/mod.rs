//! Request handlers
//!
//! Per-route handlers that sequence calls to the archive collaborator and
//! build the HTTP responses. Collaborator failures surface as 5xx responses
//! contained to the request; they never touch the lifecycle state.

mod base_path;
mod library;
mod mode;
mod search;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::archive::{ArchiveError, Archivist};
use crate::config::Preferences;
use crate::highlight::Highlighter;
use crate::render::ViewOptions;
use crate::server::lifecycle::LibraryServer;
use crate::server::types::ErrorEnvelope;

pub use base_path::{get_base_path, set_base_path};
pub use library::library_asset;
pub use mode::{get_mode, set_mode};
pub use search::{archive_index, search_html, search_json};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub server: Arc<LibraryServer>,
    pub archivist: Arc<dyn Archivist>,
    pub highlighter: Arc<dyn Highlighter>,
    pub prefs: Arc<Preferences>,
    pub views: ViewOptions,
    /// Characters of content the highlighter scans per document
    pub max_highlightable_length: usize,
    /// Optional bound on any single archivist await
    pub collaborator_timeout: Option<Duration>,
}

/// A collaborator call that did not produce a result
pub(crate) enum CallError {
    Archive(ArchiveError),
    TimedOut,
}

impl From<ArchiveError> for CallError {
    fn from(err: ArchiveError) -> Self {
        Self::Archive(err)
    }
}

impl CallError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Archive(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::TimedOut => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Archive(e) => e.to_string(),
            Self::TimedOut => "archive did not answer in time".to_string(),
        }
    }

    /// Plain-text failure, for the HTML routes.
    pub(crate) fn into_plain_response(self) -> Response {
        (self.status(), self.message()).into_response()
    }

    /// JSON error envelope, for the `.json` route.
    pub(crate) fn into_json_response(self) -> Response {
        let error = match &self {
            Self::Archive(_) => "ARCHIVE_ERROR",
            Self::TimedOut => "TIMEOUT",
        };
        (self.status(), Json(ErrorEnvelope::new(error, self.message()))).into_response()
    }
}

/// Await a collaborator call, bounded by the configured timeout when one is
/// set. Without a timeout the await is unbounded: a stalled archivist
/// blocks that request indefinitely, a documented limitation kept for
/// behavioral parity.
pub(crate) async fn bounded<T>(
    timeout: Option<Duration>,
    fut: impl Future<Output = Result<T, ArchiveError>>,
) -> Result<T, CallError> {
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result.map_err(CallError::Archive),
            Err(_) => Err(CallError::TimedOut),
        },
        None => fut.await.map_err(CallError::Archive),
    }
}
