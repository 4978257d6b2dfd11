use serde::{Deserialize, Deserializer, Serialize};

use crate::content::ContentPayload;

pub const HISTORY_LIMIT: usize = 5;

/// Recent successful fetches, newest first, capped at [`HISTORY_LIMIT`].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<ContentPayload>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(mut entries: Vec<ContentPayload>) -> Self {
        entries.truncate(HISTORY_LIMIT);
        Self { entries }
    }

    /// Inserts at the front and drops whatever falls past the cap.
    pub fn push_front(&mut self, entry: ContentPayload) {
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_LIMIT);
    }

    pub fn get(&self, index: usize) -> Option<&ContentPayload> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[ContentPayload] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContentPayload> {
        self.entries.iter()
    }
}

impl<'de> Deserialize<'de> for History {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // A malformed entry is skipped instead of discarding the whole list.
        let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
        let entries = raw
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable history entry");
                    None
                }
            })
            .collect();
        Ok(History::from_entries(entries))
    }
}
