//! Archive collaborator surface
//!
//! The server core never indexes documents itself; it sequences calls to an
//! [`Archivist`], which owns full-text search, document storage, and the
//! active indexing mode. The trait is object-safe so the request pipeline
//! can hold a `dyn Archivist`.

mod memory;

pub use memory::MemoryArchivist;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identifier the archivist assigns to a stored document
pub type DocId = u64;

/// Errors that can occur inside the archive collaborator
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Reading or writing the on-disk index failed
    #[error("index I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The on-disk index exists but cannot be parsed
    #[error("index file '{path}' is not valid JSON: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Mode switch requested for a mode the archivist does not know
    #[error("unknown mode '{0}' (expected one of: save, serve, select)")]
    UnknownMode(String),

    /// The archive shut down while a caller was waiting on readiness
    #[error("archive closed while waiting for readiness")]
    Closed,
}

/// One stored document, as returned by detail lookups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocRecord {
    pub id: DocId,
    pub url: String,
    pub title: Option<String>,
    pub content: String,
}

/// Title/url replacement the search engine may supply for a hit,
/// preferred over the raw detail record when rendering
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighlightOverride {
    pub title: Option<String>,
    pub url: Option<String>,
}

/// The outcome of one search call: ranked document ids plus any
/// per-document display overrides
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub query: String,
    pub results: Vec<DocId>,
    pub highlights: HashMap<DocId, HighlightOverride>,
}

/// Listing metadata for one archived URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMeta {
    pub title: Option<String>,
    pub id: DocId,
}

/// One entry of the archive index, serialized as the `[url, {title, id}]`
/// tuple the front end expects
pub type IndexEntry = (String, IndexMeta);

/// Full-text search and document storage collaborator
#[async_trait]
pub trait Archivist: Send + Sync {
    /// Suspend until the index is usable. Search handlers await this before
    /// every query.
    async fn ready(&self) -> Result<(), ArchiveError>;

    /// Run a full-text query and return ranked document ids.
    async fn search(&self, query: &str) -> Result<SearchOutcome, ArchiveError>;

    /// Look up the stored record for a document id.
    fn details(&self, id: DocId) -> Option<DocRecord>;

    /// The currently active indexing mode.
    fn mode(&self) -> String;

    /// Switch the indexing mode. Validating the mode name is the
    /// archivist's concern, not the caller's.
    async fn change_mode(&self, mode: &str) -> Result<(), ArchiveError>;

    /// Persist the index to disk under the current archive root.
    fn save_index(&self) -> Result<(), ArchiveError>;

    /// The full archive listing, in the archivist's own order.
    fn index(&self) -> Vec<IndexEntry>;

    /// Synchronous hook fired before the archive root changes; flushes
    /// state tied to the old root.
    fn before_path_changed(&self);

    /// Re-point the archive at the new root (e.g. reload the index).
    async fn after_path_changed(&self) -> Result<(), ArchiveError>;
}
