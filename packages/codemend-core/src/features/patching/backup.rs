//! Unit backups
//!
//! One snapshot per unit per run, taken before the first write. The store is
//! append-only while a run is in flight; only the orchestrator clears it,
//! and only after a regression-free run.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pre-patch snapshot of one unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backup {
    pub unit_path: String,
    pub original_text: String,
    pub created_at: DateTime<Utc>,
}

/// Per-run backup store, first-touch wins
#[derive(Debug, Clone, Default)]
pub struct BackupStore {
    backups: BTreeMap<String, Backup>,
}

impl BackupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot `text` for the unit unless a snapshot already exists
    pub fn ensure(&mut self, unit_path: &str, text: &str) {
        self.backups
            .entry(unit_path.to_string())
            .or_insert_with(|| Backup {
                unit_path: unit_path.to_string(),
                original_text: text.to_string(),
                created_at: Utc::now(),
            });
    }

    pub fn get(&self, unit_path: &str) -> Option<&Backup> {
        self.backups.get(unit_path)
    }

    pub fn contains(&self, unit_path: &str) -> bool {
        self.backups.contains_key(unit_path)
    }

    pub fn len(&self) -> usize {
        self.backups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backups.is_empty()
    }

    pub fn clear(&mut self) {
        self.backups.clear();
    }

    /// Path → original text, for the run report
    pub fn as_text_map(&self) -> BTreeMap<String, String> {
        self.backups
            .iter()
            .map(|(path, backup)| (path.clone(), backup.original_text.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_touch_wins() {
        let mut store = BackupStore::new();
        store.ensure("a.py", "original");
        store.ensure("a.py", "already patched");

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a.py").unwrap().original_text, "original");
    }

    #[test]
    fn test_text_map() {
        let mut store = BackupStore::new();
        store.ensure("b.py", "bb");
        store.ensure("a.py", "aa");

        let map = store.as_text_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a.py").map(String::as_str), Some("aa"));
    }
}
