//! Runtime-mutable preferences
//!
//! The archive root can be moved while the server is running, so it lives in
//! a small JSON preferences file under the data directory rather than in the
//! read-only TOML config. `update_base_path` is the single write path and
//! reports whether the value actually changed, which is what the base-path
//! restart protocol keys off.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

const PREFS_FILE_NAME: &str = "preferences.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Stored {
    base_path: PathBuf,
}

/// Persisted, runtime-mutable preferences
#[derive(Debug)]
pub struct Preferences {
    file: PathBuf,
    inner: Mutex<Stored>,
}

impl Preferences {
    /// Load preferences from the data directory, falling back to
    /// `default_base` when no preferences file exists yet.
    pub fn load(data_dir: &Path, default_base: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir).with_context(|| {
            format!("Failed to create data directory '{}'", data_dir.display())
        })?;
        let file = data_dir.join(PREFS_FILE_NAME);

        let stored = if file.exists() {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read '{}'", file.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("'{}' is not valid preferences JSON", file.display()))?
        } else {
            Stored {
                base_path: default_base.to_path_buf(),
            }
        };

        Ok(Self {
            file,
            inner: Mutex::new(stored),
        })
    }

    /// The currently configured archive root.
    pub fn base_path(&self) -> PathBuf {
        self.inner.lock().base_path.clone()
    }

    /// Persist a new archive root. Returns `false` without touching disk
    /// when the path equals the current one.
    pub fn update_base_path(&self, new_path: &Path) -> Result<bool> {
        let mut stored = self.inner.lock();
        if stored.base_path == new_path {
            return Ok(false);
        }
        stored.base_path = new_path.to_path_buf();
        let serialized =
            serde_json::to_string_pretty(&*stored).context("Failed to serialize preferences")?;
        fs::write(&self.file, serialized)
            .with_context(|| format!("Failed to write '{}'", self.file.display()))?;
        info!(base_path = %new_path.display(), "base path saved to preferences");
        Ok(true)
    }
}
