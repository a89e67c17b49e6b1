//! Search and listing handlers
//!
//! Both search routes run the same pipeline (await readiness, fetch ranked
//! ids, map each id to its detail record) and differ only in presentation:
//! the HTML route assembles one snippet per result, the JSON route returns
//! the bare records in a pretty-printed envelope.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use tracing::debug;

use crate::archive::{DocRecord, SearchOutcome};
use crate::highlight::snippet;
use crate::render;
use crate::server::types::{ResultJson, SearchEnvelope};

use super::{bounded, AppState, CallError};

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Missing query becomes the empty string; no validation beyond that
    #[serde(default)]
    query: String,
}

/// Readiness, then search, then one detail lookup per ranked id. Ids the
/// archivist can no longer resolve are skipped.
async fn run_search(
    state: &AppState,
    query: &str,
) -> Result<(SearchOutcome, Vec<DocRecord>), CallError> {
    bounded(state.collaborator_timeout, state.archivist.ready()).await?;
    let outcome = bounded(state.collaborator_timeout, state.archivist.search(query)).await?;
    let records = outcome
        .results
        .iter()
        .filter_map(|&id| {
            let record = state.archivist.details(id);
            if record.is_none() {
                debug!(id, "search hit has no detail record; skipping");
            }
            record
        })
        .collect();
    Ok((outcome, records))
}

/// `GET /search?query=<q>`
pub async fn search_html(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let (outcome, records) = match run_search(&state, &params.query).await {
        Ok(found) => found,
        Err(e) => return e.into_plain_response(),
    };

    let items: Vec<render::ResultItem> = records
        .into_iter()
        .map(|record| {
            let snippet = snippet::assemble(
                state.highlighter.as_ref(),
                &outcome.query,
                &record.content,
                state.max_highlightable_length,
            );
            render::ResultItem { record, snippet }
        })
        .collect();

    Html(render::search_results_view(
        &items,
        &outcome.query,
        &outcome.highlights,
        &state.views,
    ))
    .into_response()
}

/// `GET /search.json?query=<q>`: same pipeline, no snippets, 2-space
/// pretty-printed envelope.
pub async fn search_json(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let (outcome, records) = match run_search(&state, &params.query).await {
        Ok(found) => found,
        Err(e) => return e.into_json_response(),
    };

    let envelope = SearchEnvelope {
        results: records.iter().map(ResultJson::from).collect(),
        query: outcome.query,
    };
    match serde_json::to_string_pretty(&envelope) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to serialize results: {e}"),
        )
            .into_response(),
    }
}

/// `GET /archive_index.html`: persist the index, then render the listing.
pub async fn archive_index(State(state): State<AppState>) -> Response {
    if let Err(e) = state.archivist.save_index() {
        return CallError::from(e).into_plain_response();
    }
    let entries = state.archivist.index();
    Html(render::index_view(&entries, &state.views)).into_response()
}
