use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to access history file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed history file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Recently used search terms and the last searched directory.
pub trait HistoryStore {
    /// Most recent first.
    fn load_recent_terms(&self) -> Result<Vec<String>, HistoryError>;
    fn save_term(&mut self, term: &str) -> Result<(), HistoryError>;
    fn load_last_path(&self) -> Result<Option<PathBuf>, HistoryError>;
    fn save_last_path(&mut self, path: &Path) -> Result<(), HistoryError>;
    fn clear_all(&mut self) -> Result<(), HistoryError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    pub recent_terms: Vec<String>,
    #[serde(default)]
    pub last_path: Option<PathBuf>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
}

impl History {
    /// Returns a copy with `term` moved to the front, keeping at most `limit`.
    pub fn with_term(&self, term: &str, limit: usize) -> Self {
        let recent_terms = std::iter::once(term.to_string())
            .chain(self.recent_terms.iter().filter(|t| *t != term).cloned())
            .take(limit)
            .collect();

        Self {
            recent_terms,
            ..self.clone()
        }
    }

    pub fn with_last_path(&self, path: &Path) -> Self {
        Self {
            last_path: Some(path.to_path_buf()),
            ..self.clone()
        }
    }
}

/// History persisted as a pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonHistory {
    path: PathBuf,
    limit: usize,
}

impl JsonHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_limit(path, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(path: impl Into<PathBuf>, limit: usize) -> Self {
        Self {
            path: path.into(),
            limit,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<History, HistoryError> {
        if !self.path.exists() {
            return Ok(History::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, history: &History) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let stamped = History {
            updated: Some(Utc::now()),
            ..history.clone()
        };
        std::fs::write(&self.path, serde_json::to_string_pretty(&stamped)?)?;
        debug!(path = %self.path.display(), "history saved");
        Ok(())
    }
}

impl HistoryStore for JsonHistory {
    fn load_recent_terms(&self) -> Result<Vec<String>, HistoryError> {
        Ok(self.read()?.recent_terms)
    }

    fn save_term(&mut self, term: &str) -> Result<(), HistoryError> {
        if term.is_empty() {
            return Ok(());
        }
        let history = self.read()?.with_term(term, self.limit);
        self.write(&history)
    }

    fn load_last_path(&self) -> Result<Option<PathBuf>, HistoryError> {
        Ok(self.read()?.last_path)
    }

    fn save_last_path(&mut self, path: &Path) -> Result<(), HistoryError> {
        let history = self.read()?.with_last_path(path);
        self.write(&history)
    }

    fn clear_all(&mut self) -> Result<(), HistoryError> {
        self.write(&History::default())
    }
}

#[derive(Debug, Clone)]
pub struct MemoryHistory {
    history: History,
    limit: usize,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self {
            history: History::default(),
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistory {
    fn load_recent_terms(&self) -> Result<Vec<String>, HistoryError> {
        Ok(self.history.recent_terms.clone())
    }

    fn save_term(&mut self, term: &str) -> Result<(), HistoryError> {
        if !term.is_empty() {
            self.history = self.history.with_term(term, self.limit);
        }
        Ok(())
    }

    fn load_last_path(&self) -> Result<Option<PathBuf>, HistoryError> {
        Ok(self.history.last_path.clone())
    }

    fn save_last_path(&mut self, path: &Path) -> Result<(), HistoryError> {
        self.history = self.history.with_last_path(path);
        Ok(())
    }

    fn clear_all(&mut self) -> Result<(), HistoryError> {
        self.history = History::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn term_moves_to_front() {
        let mut store = MemoryHistory::new();
        for term in ["alpha", "beta", "gamma", "beta"] {
            store.save_term(term).unwrap();
        }

        assert_eq!(
            store.load_recent_terms().unwrap(),
            vec!["beta", "gamma", "alpha"]
        );
    }

    #[test]
    fn keeps_at_most_ten_terms() {
        let mut store = MemoryHistory::new();
        for i in 0..15 {
            store.save_term(&format!("term{i}")).unwrap();
        }

        let terms = store.load_recent_terms().unwrap();
        assert_eq!(terms.len(), 10);
        assert_eq!(terms[0], "term14");
        assert_eq!(terms[9], "term5");
    }

    #[test]
    fn empty_term_is_ignored() {
        let mut store = MemoryHistory::new();
        store.save_term("").unwrap();
        assert!(store.load_recent_terms().unwrap().is_empty());
    }

    #[test]
    fn json_history_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state/history.json");

        let mut store = JsonHistory::new(&path);
        store.save_term("needle").unwrap();
        store.save_term("haystack").unwrap();
        store.save_last_path(Path::new("/srv/docs")).unwrap();

        let reopened = JsonHistory::new(&path);
        assert_eq!(
            reopened.load_recent_terms().unwrap(),
            vec!["haystack", "needle"]
        );
        assert_eq!(
            reopened.load_last_path().unwrap(),
            Some(PathBuf::from("/srv/docs"))
        );
    }

    #[test]
    fn clear_all_forgets_everything() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonHistory::new(dir.path().join("history.json"));
        store.save_term("needle").unwrap();
        store.save_last_path(dir.path()).unwrap();

        store.clear_all().unwrap();

        assert!(store.load_recent_terms().unwrap().is_empty());
        assert_eq!(store.load_last_path().unwrap(), None);
    }

    #[test]
    fn missing_file_is_empty_history() {
        let dir = TempDir::new().unwrap();
        let store = JsonHistory::new(dir.path().join("none.json"));
        assert!(store.load_recent_terms().unwrap().is_empty());
    }

    #[test]
    fn custom_limit_is_respected() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonHistory::with_limit(dir.path().join("h.json"), 2);
        for term in ["a", "b", "c"] {
            store.save_term(term).unwrap();
        }
        assert_eq!(store.load_recent_terms().unwrap(), vec!["c", "b"]);
    }
}
