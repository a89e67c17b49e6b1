//! Base-path handlers
//!
//! `POST /base_path` runs the lifecycle manager's change protocol. The
//! response goes out before the restart completes, so on success it tells
//! the caller to watch the logs rather than assume immediate availability.

use std::path::PathBuf;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use crate::server::lifecycle::BasePathOutcome;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct BasePathForm {
    base_path: PathBuf,
}

/// Returns the currently configured archive root as plain text.
pub async fn get_base_path(State(state): State<AppState>) -> String {
    state.prefs.base_path().display().to_string()
}

/// Runs the base-path change protocol.
pub async fn set_base_path(
    State(state): State<AppState>,
    Form(form): Form<BasePathForm>,
) -> Response {
    match state.server.change_base_path(&form.base_path).await {
        Ok(BasePathOutcome::Unchanged) => "Base path not changed.".into_response(),
        Ok(BasePathOutcome::Restarting) => format!(
            "Base path set to {} and saved to preferences. \
             Server restarting; watch the logs for progress.",
            form.base_path.display()
        )
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("base path change failed: {e}"),
        )
            .into_response(),
    }
}
