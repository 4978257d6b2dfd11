use crate::session::history::History;

/// Storage key for the recent-searches list (JSON array, newest first).
pub const HISTORY_KEY: &str = "learningHistory";
/// Storage key for the theme flag (`true` / `false`).
pub const DARK_MODE_KEY: &str = "darkMode";

/// Everything restored at startup.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoredState {
    pub history: History,
    pub dark_mode: bool,
}
