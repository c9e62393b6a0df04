//! Persistence boundary for day-records and settings.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::{Map, Value};

use crate::error::{EngineError, EngineResult};
use crate::models::DayRecord;

use super::record_store::dedupe_by_id;

/// Free-form settings document keyed by top-level name.
pub type Settings = Map<String, Value>;

/// Settings key holding a persisted compensation policy override.
pub const POLICY_SETTINGS_KEY: &str = "compensationPolicy";

/// A backend able to persist the full record collection and the settings
/// document.
///
/// Implementations must make [`Storage::replace_work_days`] atomic: either
/// the whole new collection is visible afterwards, or the old one is.
pub trait Storage: Send + Sync {
    /// Loads every persisted record in stored order.
    fn load_work_days(&self) -> EngineResult<Vec<DayRecord>>;

    /// Replaces the persisted collection with `records`.
    ///
    /// Records repeating an earlier id are dropped. Returns the number of
    /// records stored.
    fn replace_work_days(&self, records: Vec<DayRecord>) -> EngineResult<usize>;

    /// Loads the settings document; empty when nothing was saved.
    fn load_settings(&self) -> EngineResult<Settings>;

    /// Merges `patch` into the stored settings, replacing keys present in
    /// both, and returns the resulting document.
    fn merge_settings(&self, patch: Settings) -> EngineResult<Settings>;

    /// Returns true when the backend can currently serve requests.
    fn is_healthy(&self) -> bool;
}

/// In-process storage used by tests and ephemeral servers.
#[derive(Debug)]
pub struct MemoryStorage {
    work_days: RwLock<Vec<DayRecord>>,
    settings: RwLock<Settings>,
    healthy: AtomicBool,
}

impl MemoryStorage {
    /// Creates an empty, healthy storage.
    pub fn new() -> Self {
        Self {
            work_days: RwLock::new(Vec::new()),
            settings: RwLock::new(Settings::new()),
            healthy: AtomicBool::new(true),
        }
    }

    /// Creates a storage pre-populated with `records`.
    pub fn with_records(records: Vec<DayRecord>) -> Self {
        let storage = Self::new();
        let (records, _) = dedupe_by_id(records);
        if let Ok(mut guard) = storage.work_days.write() {
            *guard = records;
        }
        storage
    }

    /// Flips the reported health, for exercising degraded paths.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> EngineError {
    EngineError::Storage {
        message: "storage lock poisoned".to_string(),
    }
}

impl Storage for MemoryStorage {
    fn load_work_days(&self) -> EngineResult<Vec<DayRecord>> {
        let guard = self.work_days.read().map_err(|_| poisoned())?;
        Ok(guard.clone())
    }

    fn replace_work_days(&self, records: Vec<DayRecord>) -> EngineResult<usize> {
        let (records, _) = dedupe_by_id(records);
        let count = records.len();
        let mut guard = self.work_days.write().map_err(|_| poisoned())?;
        *guard = records;
        Ok(count)
    }

    fn load_settings(&self) -> EngineResult<Settings> {
        let guard = self.settings.read().map_err(|_| poisoned())?;
        Ok(guard.clone())
    }

    fn merge_settings(&self, patch: Settings) -> EngineResult<Settings> {
        let mut guard = self.settings.write().map_err(|_| poisoned())?;
        guard.extend(patch);
        Ok(guard.clone())
    }

    fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_record(id: i64, date: &str) -> DayRecord {
        DayRecord {
            id,
            date: date.to_string(),
            clock_in: "08:00".to_string(),
            break_out: String::new(),
            break_in: String::new(),
            clock_out: "17:00".to_string(),
            is_saturday: false,
        }
    }

    #[test]
    fn test_replace_is_wholesale() {
        let storage = MemoryStorage::with_records(vec![make_record(1, "2024-06-01")]);
        let stored = storage
            .replace_work_days(vec![make_record(2, "2024-06-02"), make_record(3, "2024-06-03")])
            .unwrap();

        assert_eq!(stored, 2);
        let ids: Vec<i64> = storage
            .load_work_days()
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_replace_drops_duplicate_ids() {
        let storage = MemoryStorage::new();
        let stored = storage
            .replace_work_days(vec![
                make_record(1, "2024-06-01"),
                make_record(1, "2024-06-05"),
            ])
            .unwrap();

        assert_eq!(stored, 1);
        assert_eq!(storage.load_work_days().unwrap()[0].date, "2024-06-01");
    }

    #[test]
    fn test_merge_settings_keeps_untouched_keys() {
        let storage = MemoryStorage::new();
        let mut first = Settings::new();
        first.insert("theme".to_string(), json!("dark"));
        first.insert("locale".to_string(), json!("pt-BR"));
        storage.merge_settings(first).unwrap();

        let mut second = Settings::new();
        second.insert("theme".to_string(), json!("light"));
        let merged = storage.merge_settings(second).unwrap();

        assert_eq!(merged["theme"], json!("light"));
        assert_eq!(merged["locale"], json!("pt-BR"));
        assert_eq!(storage.load_settings().unwrap(), merged);
    }

    #[test]
    fn test_health_toggle() {
        let storage = MemoryStorage::new();
        assert!(storage.is_healthy());
        storage.set_healthy(false);
        assert!(!storage.is_healthy());
    }
}
