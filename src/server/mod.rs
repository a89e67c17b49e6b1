//! HTTP server core
//!
//! The lifecycle manager owns the single listening endpoint; the handlers
//! sequence calls to the archive and highlighting collaborators and build
//! the responses. Routes are registered exactly once at construction and
//! the same router is reused across base-path restarts.

pub mod handlers;
pub mod lifecycle;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use lifecycle::{BasePathOutcome, LibraryServer, ServiceSnapshot};
pub use routes::build_router;
