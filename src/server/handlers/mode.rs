//! Indexing-mode handlers

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use super::{bounded, AppState};

#[derive(Debug, Deserialize)]
pub struct ModeForm {
    mode: String,
}

/// Returns the archivist's current mode as plain text.
pub async fn get_mode(State(state): State<AppState>) -> String {
    state.archivist.mode()
}

/// Delegates the switch to the archivist. Validating the mode name is the
/// archivist's concern; this layer passes it through.
pub async fn set_mode(State(state): State<AppState>, Form(form): Form<ModeForm>) -> Response {
    match bounded(
        state.collaborator_timeout,
        state.archivist.change_mode(&form.mode),
    )
    .await
    {
        Ok(()) => format!("Mode set to {}", form.mode).into_response(),
        Err(e) => e.into_plain_response(),
    }
}
