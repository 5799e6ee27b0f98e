use std::fs;
use std::path::PathBuf;

use chrono::{Duration, Utc};
use tracing::warn;

use crate::config::HISTORY_RETENTION_DAYS;
use crate::error::Result;
use crate::types::HistoryEntry;

/// Rolling on-disk run history: one JSON array, rewritten in full on each save
/// with entries older than the retention window dropped.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append one run to the history file. An unreadable or corrupt existing
    /// file degrades to an empty history; the save itself goes through a temp
    /// file renamed over the target, so a crash mid-write leaves the previous
    /// file intact.
    pub fn append(&self, entry: HistoryEntry) -> Result<()> {
        let mut history = self.load();
        history.push(entry);

        let cutoff = Utc::now() - Duration::days(HISTORY_RETENTION_DAYS);
        history.retain(|e| e.timestamp > cutoff);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&history)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn load(&self) -> Vec<HistoryEntry> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_slice(&bytes) {
            Ok(history) => history,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "history file unreadable; starting fresh"
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CommodityResult;

    fn entry(timestamp: chrono::DateTime<Utc>) -> HistoryEntry {
        HistoryEntry {
            timestamp,
            results: Vec::<CommodityResult>::new(),
        }
    }

    fn read_back(path: &std::path::Path) -> Vec<HistoryEntry> {
        serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
    }

    #[test]
    fn save_drops_entries_past_retention() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let stale = entry(Utc::now() - Duration::days(31));
        let fresh = entry(Utc::now() - Duration::days(29));
        fs::write(&path, serde_json::to_vec(&vec![stale, fresh]).unwrap()).unwrap();

        let store = HistoryStore::new(&path);
        store.append(entry(Utc::now())).unwrap();

        let history = read_back(&path);
        assert_eq!(history.len(), 2);
        let cutoff = Utc::now() - Duration::days(HISTORY_RETENTION_DAYS);
        assert!(history.iter().all(|e| e.timestamp > cutoff));
    }

    #[test]
    fn append_preserves_chronological_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let store = HistoryStore::new(&path);

        let first = Utc::now() - Duration::hours(12);
        let second = Utc::now() - Duration::hours(6);
        store.append(entry(first)).unwrap();
        store.append(entry(second)).unwrap();
        store.append(entry(Utc::now())).unwrap();

        let history = read_back(&path);
        assert_eq!(history.len(), 3);
        assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, b"{not json").unwrap();

        let store = HistoryStore::new(&path);
        store.append(entry(Utc::now())).unwrap();

        assert_eq!(read_back(&path).len(), 1);
    }

    #[test]
    fn save_creates_parent_dir_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");

        let store = HistoryStore::new(&path);
        store.append(entry(Utc::now())).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }
}
