use purr_search_core::{SearchOptions, DEFAULT_CONTEXT_CHARS, DEFAULT_SHEET_MATCH_LIMIT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::history::DEFAULT_HISTORY_LIMIT;

const APP_DIR: &str = "purr-search";
const CONFIG_FILE: &str = "config.json";
const HISTORY_FILE: &str = "history.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Characters of context kept either side of a plain-text match.
    pub context_chars: usize,
    /// Matches reported per legacy spreadsheet sheet before truncating.
    pub sheet_match_limit: usize,
    pub history_limit: usize,
    /// Overrides the history file location.
    pub history_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            context_chars: DEFAULT_CONTEXT_CHARS,
            sheet_match_limit: DEFAULT_SHEET_MATCH_LIMIT,
            history_limit: DEFAULT_HISTORY_LIMIT,
            history_path: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(Into::into)
    }

    /// Missing file means defaults; a malformed one is still an error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(Into::into)
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            context_chars: self.context_chars,
            sheet_match_limit: self.sheet_match_limit,
            ..Default::default()
        }
    }

    pub fn history_file(&self) -> Option<PathBuf> {
        self.history_path
            .clone()
            .or_else(|| config_dir().map(|dir| dir.join(HISTORY_FILE)))
    }
}

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR))
}

pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn config_save_load() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("nested/config.json");

        let config = Config {
            context_chars: 8,
            history_path: Some(dir.path().join("h.json")),
            ..Default::default()
        };
        config.save(&config_path).unwrap();

        let loaded = Config::load(&config_path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.history_file(), Some(dir.path().join("h.json")));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"context_chars": 4}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.context_chars, 4);
        assert_eq!(config.sheet_match_limit, DEFAULT_SHEET_MATCH_LIMIT);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(Config::load_or_default(&path).is_err());
    }

    #[test]
    fn options_carry_limits() {
        let config = Config {
            context_chars: 5,
            sheet_match_limit: 3,
            ..Default::default()
        };
        let options = config.search_options();
        assert_eq!(options.context_chars, 5);
        assert_eq!(options.sheet_match_limit, 3);
        assert!(!options.case_sensitive);
    }
}
