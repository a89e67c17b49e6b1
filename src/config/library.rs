//! Archive and display configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Archive and display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Directory for preferences and other server-owned state
    pub data_dir: PathBuf,
    /// Initial archive root, used until the preferences file says otherwise
    #[serde(default)]
    pub base_path: Option<PathBuf>,
    /// Directory holding the bundled front-end assets
    pub site_dir: PathBuf,
    /// Mount the archive root itself under /library
    pub expose_archive: bool,
    /// Maximum characters of a title shown in listings
    pub max_title_length: usize,
    /// Characters of document content the highlighter scans for snippets
    pub max_highlightable_length: usize,
    /// Prefix list entries with the internal document id
    pub debug_ids: bool,
}

impl LibraryConfig {
    /// The archive root to use when neither the preferences file nor the
    /// config file names one.
    pub fn default_base_path(&self) -> PathBuf {
        self.base_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("archive"))
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            data_dir: directories::ProjectDirs::from("", "", "webshelf")
                .map(|d| d.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".webshelf")),
            base_path: None,
            site_dir: PathBuf::from("public"),
            expose_archive: true,
            max_title_length: 140,
            max_highlightable_length: 3000,
            debug_ids: false,
        }
    }
}
