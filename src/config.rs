use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::content::Difficulty;

pub const API_URL_ENV: &str = "SKILLMATE_API_URL";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub default_difficulty: Difficulty,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_light_theme")]
    pub light_theme: String,
    #[serde(default = "default_dark_theme")]
    pub dark_theme: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_url() -> String {
    "https://skillmate-demo-api.onrender.com".to_string()
}
fn default_request_timeout_secs() -> u64 {
    60
}
fn default_light_theme() -> String {
    "light".to_string()
}
fn default_dark_theme() -> String {
    "dark".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            default_difficulty: Difficulty::default(),
            request_timeout_secs: default_request_timeout_secs(),
            light_theme: default_light_theme(),
            dark_theme: default_dark_theme(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Reads the config file (if any), then applies `SKILLMATE_API_URL`.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.normalize();
        Ok(config)
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skillmate")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_url = url;
        }
    }

    /// Trims the base URL and replaces values that cannot work.
    pub fn normalize(&mut self) {
        let trimmed = self.api_url.trim().trim_end_matches('/');
        self.api_url = if trimmed.is_empty() {
            default_api_url()
        } else {
            trimmed.to_string()
        };
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = default_request_timeout_secs();
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn theme_name(&self, dark_mode: bool) -> &str {
        if dark_mode {
            &self.dark_theme
        } else {
            &self.light_theme
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.api_url, "https://skillmate-demo-api.onrender.com");
        assert_eq!(config.default_difficulty, Difficulty::Beginner);
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.theme_name(true), "dark");
        assert_eq!(config.theme_name(false), "light");
    }

    #[test]
    fn test_config_partial_file() {
        let toml_str = r#"
api_url = "http://localhost:5000/"
default_difficulty = "advanced"
"#;
        let mut config: Config = toml::from_str(toml_str).unwrap();
        config.normalize();
        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(config.default_difficulty, Difficulty::Advanced);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_env_overrides_file_value() {
        let mut config = Config {
            api_url: "http://from-file".to_string(),
            ..Config::default()
        };
        config.apply_env(|key| (key == API_URL_ENV).then(|| "http://from-env".to_string()));
        assert_eq!(config.api_url, "http://from-env");
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let mut config = Config::default();
        config.apply_env(|_| Some("   ".to_string()));
        assert_eq!(config.api_url, default_api_url());
    }

    #[test]
    fn test_normalize_repairs_unusable_values() {
        let mut config = Config {
            api_url: " / ".to_string(),
            request_timeout_secs: 0,
            ..Config::default()
        };
        config.normalize();
        assert_eq!(config.api_url, default_api_url());
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.api_url, deserialized.api_url);
        assert_eq!(config.default_difficulty, deserialized.default_difficulty);
        assert_eq!(config.dark_theme, deserialized.dark_theme);
    }
}
