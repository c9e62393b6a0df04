//! Local JSON backup used when the server cannot be reached.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::DayRecord;
use crate::store::Settings;

const WORK_DAYS_FILE: &str = "work_days_backup.json";
const SETTINGS_FILE: &str = "settings_backup.json";

/// Directory holding the last unsaved collection and settings.
#[derive(Debug, Clone)]
pub struct LocalBackup {
    dir: PathBuf,
}

impl LocalBackup {
    /// Uses `dir` for backup files; it is created on first write.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// The backup directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Overwrites the work-day backup with `records`.
    pub fn save_work_days(&self, records: &[DayRecord]) -> EngineResult<()> {
        let json = serde_json::to_string(records)?;
        self.write(WORK_DAYS_FILE, &json)?;
        debug!(count = records.len(), "work days backed up locally");
        Ok(())
    }

    /// Reads the work-day backup.
    ///
    /// A missing file, a non-array document or unreadable entries yield no
    /// records rather than an error.
    pub fn load_work_days(&self) -> EngineResult<Vec<DayRecord>> {
        let Some(value) = self.read(WORK_DAYS_FILE)? else {
            return Ok(Vec::new());
        };
        Ok(records_from_value(value))
    }

    /// Merges `patch` into the settings backup.
    pub fn save_settings(&self, patch: &Settings) -> EngineResult<()> {
        let mut settings = self.load_settings()?;
        settings.extend(patch.clone());
        self.write(SETTINGS_FILE, &serde_json::to_string(&settings)?)
    }

    /// Reads the settings backup; empty when absent or not an object.
    pub fn load_settings(&self) -> EngineResult<Settings> {
        match self.read(SETTINGS_FILE)? {
            Some(Value::Object(settings)) => Ok(settings),
            _ => Ok(Settings::new()),
        }
    }

    /// Deletes both backup files.
    pub fn clear(&self) -> EngineResult<()> {
        for name in [WORK_DAYS_FILE, SETTINGS_FILE] {
            match fs::remove_file(self.dir.join(name)) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(io_error(&self.dir.join(name), e)),
            }
        }
        Ok(())
    }

    fn write(&self, name: &str, contents: &str) -> EngineResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;

        let target = self.dir.join(name);
        let staging = self.dir.join(format!("{}.tmp", name));
        fs::write(&staging, contents).map_err(|e| io_error(&staging, e))?;
        fs::rename(&staging, &target).map_err(|e| io_error(&target, e))
    }

    fn read(&self, name: &str) -> EngineResult<Option<Value>> {
        let path = self.dir.join(name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path, e)),
        };

        match serde_json::from_str(&content) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring corrupt backup file");
                Ok(None)
            }
        }
    }
}

/// Decodes a work-day payload, treating anything but an array as empty.
pub(crate) fn records_from_value(value: Value) -> Vec<DayRecord> {
    let Value::Array(items) = value else {
        return Vec::new();
    };

    let total = items.len();
    let records: Vec<DayRecord> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if records.len() < total {
        warn!(skipped = total - records.len(), "skipped unreadable work day entries");
    }
    records
}

fn io_error(path: &Path, error: std::io::Error) -> EngineError {
    EngineError::Storage {
        message: format!("{}: {}", path.display(), error),
    }
}
