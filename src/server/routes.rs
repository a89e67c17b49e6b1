//! Route definitions
//!
//! All routes are registered here, once, the router is handed to the
//! lifecycle manager and cloned for every (re)start. There is no
//! re-registration path, so restarts can never stack duplicate handlers.

use axum::http::Method;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{LibraryConfig, ServerConfig};

use super::handlers::{self, AppState};

/// Build the request router: search, mode, listing, base-path, the
/// optional archive mount, and the bundled UI as the static fallback.
pub fn build_router(state: AppState, server: &ServerConfig, library: &LibraryConfig) -> Router {
    let mut app = Router::new()
        .route("/search", get(handlers::search_html))
        .route("/search.json", get(handlers::search_json))
        .route("/mode", get(handlers::get_mode).post(handlers::set_mode))
        .route("/archive_index.html", get(handlers::archive_index))
        .route(
            "/base_path",
            get(handlers::get_base_path).post(handlers::set_base_path),
        );

    if library.expose_archive {
        app = app.route("/library/*path", get(handlers::library_asset));
    }

    let mut app = app
        .fallback_service(ServeDir::new(&library.site_dir))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if server.cors_enabled {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
            .allow_origin(Any);
        app = app.layer(cors);
    }

    app
}
