use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::session::history::History;
use crate::store::schema::{DARK_MODE_KEY, HISTORY_KEY, StoredState};

/// Key-value store with one JSON file per key under a data directory.
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skillmate");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }

    /// Raw value for `key`, `None` when never written or unreadable.
    pub fn get(&self, key: &str) -> Option<String> {
        let path = self.file_path(key);
        if !path.exists() {
            return None;
        }
        match fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read stored value");
                None
            }
        }
    }

    /// Atomically replaces the value for `key`.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.file_path(key);
        let tmp_path = path.with_extension("json.tmp");

        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Restores history and theme. Missing or corrupt keys fall back to an
    /// empty history and light mode.
    pub fn load(&self) -> StoredState {
        let history = match self.get(HISTORY_KEY) {
            Some(json) => serde_json::from_str::<History>(&json).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "discarding unreadable history");
                History::default()
            }),
            None => History::default(),
        };
        let dark_mode = self
            .get(DARK_MODE_KEY)
            .is_some_and(|v| v.trim() == "true");

        StoredState { history, dark_mode }
    }

    /// Overwrites both keys wholesale.
    pub fn save(&self, history: &History, dark_mode: bool) -> Result<()> {
        let json = serde_json::to_string_pretty(history)?;
        self.set(HISTORY_KEY, &json)?;
        self.set(DARK_MODE_KEY, if dark_mode { "true" } else { "false" })?;
        tracing::debug!(entries = history.len(), dark_mode, "preferences saved");
        Ok(())
    }
}
