//! In-memory reference archivist
//!
//! A deliberately simple implementation of [`Archivist`]: the whole record
//! table lives in memory and is loaded from `<base path>/index.json`, a JSON
//! array of records whose order defines the listing order. Search ranks by
//! query-term overlap. There is no inverted index; this exists so the server
//! core has a working collaborator and the pipeline is testable.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::Preferences;

use super::{
    ArchiveError, Archivist, DocId, DocRecord, IndexEntry, IndexMeta, SearchOutcome,
};

const INDEX_FILE_NAME: &str = "index.json";

/// The archiver strategies the mode endpoint can switch between
pub const MODES: [&str; 3] = ["save", "serve", "select"];

/// JSON-file-backed in-memory archive
pub struct MemoryArchivist {
    prefs: Arc<Preferences>,
    records: Mutex<Vec<DocRecord>>,
    mode: Mutex<String>,
    ready_tx: watch::Sender<bool>,
}

impl MemoryArchivist {
    /// Open the archive against the preferences' current base path.
    pub fn open(prefs: Arc<Preferences>) -> Result<Self, ArchiveError> {
        let records = load_index(&prefs.base_path())?;
        info!(documents = records.len(), "archive index loaded");
        let (ready_tx, _) = watch::channel(true);
        Ok(Self {
            prefs,
            records: Mutex::new(records),
            mode: Mutex::new("serve".to_string()),
            ready_tx,
        })
    }
}

fn load_index(base_path: &Path) -> Result<Vec<DocRecord>, ArchiveError> {
    let file = base_path.join(INDEX_FILE_NAME);
    if !file.exists() {
        info!(path = %file.display(), "no index file at archive root, starting empty");
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(&file)?;
    serde_json::from_str(&content).map_err(|source| ArchiveError::Malformed {
        path: file.display().to_string(),
        source,
    })
}

fn write_index(base_path: &Path, records: &[DocRecord]) -> Result<(), ArchiveError> {
    std::fs::create_dir_all(base_path)?;
    let file = base_path.join(INDEX_FILE_NAME);
    let serialized = serde_json::to_string_pretty(records).map_err(|source| {
        ArchiveError::Malformed {
            path: file.display().to_string(),
            source,
        }
    })?;
    std::fs::write(&file, serialized)?;
    Ok(())
}

/// Count how many distinct query terms occur in the record.
fn term_overlap(terms: &[String], record: &DocRecord) -> usize {
    let title = record.title.as_deref().unwrap_or("").to_lowercase();
    let content = record.content.to_lowercase();
    terms
        .iter()
        .filter(|t| title.contains(t.as_str()) || content.contains(t.as_str()))
        .count()
}

#[async_trait]
impl Archivist for MemoryArchivist {
    async fn ready(&self) -> Result<(), ArchiveError> {
        let mut rx = self.ready_tx.subscribe();
        rx.wait_for(|ready| *ready)
            .await
            .map_err(|_| ArchiveError::Closed)?;
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<SearchOutcome, ArchiveError> {
        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let records = self.records.lock();
        let mut scored: Vec<(DocId, usize)> = records
            .iter()
            .map(|r| (r.id, term_overlap(&terms, r)))
            .filter(|(_, score)| *score > 0)
            .collect();
        // Stable sort keeps insertion order for equal scores
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        debug!(query, hits = scored.len(), "archive search");
        Ok(SearchOutcome {
            query: query.to_string(),
            results: scored.into_iter().map(|(id, _)| id).collect(),
            highlights: HashMap::new(),
        })
    }

    fn details(&self, id: DocId) -> Option<DocRecord> {
        self.records.lock().iter().find(|r| r.id == id).cloned()
    }

    fn mode(&self) -> String {
        self.mode.lock().clone()
    }

    async fn change_mode(&self, mode: &str) -> Result<(), ArchiveError> {
        if !MODES.contains(&mode) {
            return Err(ArchiveError::UnknownMode(mode.to_string()));
        }
        *self.mode.lock() = mode.to_string();
        info!(mode, "archive mode changed");
        Ok(())
    }

    fn save_index(&self) -> Result<(), ArchiveError> {
        let records = self.records.lock();
        write_index(&self.prefs.base_path(), &records)
    }

    fn index(&self) -> Vec<IndexEntry> {
        self.records
            .lock()
            .iter()
            .map(|r| {
                (
                    r.url.clone(),
                    IndexMeta {
                        title: r.title.clone(),
                        id: r.id,
                    },
                )
            })
            .collect()
    }

    fn before_path_changed(&self) {
        // Flush to the old root; the preferences still point there
        if let Err(e) = self.save_index() {
            warn!("failed to flush index before path change: {e}");
        }
    }

    async fn after_path_changed(&self) -> Result<(), ArchiveError> {
        // Concurrent searches suspend until the reload finishes
        self.ready_tx.send_replace(false);
        let new_root = self.prefs.base_path();
        let result = tokio::task::spawn_blocking(move || load_index(&new_root))
            .await
            .map_err(|_| ArchiveError::Closed)?;
        match result {
            Ok(records) => {
                info!(documents = records.len(), "archive re-pointed at new root");
                *self.records.lock() = records;
                self.ready_tx.send_replace(true);
                Ok(())
            }
            Err(e) => {
                // Leave readiness down rather than serve a half-state
                warn!("failed to load index from new root: {e}");
                Err(e)
            }
        }
    }
}
