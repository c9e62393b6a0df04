//! SQLite-backed [`Storage`].

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, params};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::DayRecord;

use super::record_store::dedupe_by_id;
use super::storage::{Settings, Storage};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS work_days (
    id INTEGER PRIMARY KEY,
    position INTEGER NOT NULL,
    date TEXT NOT NULL DEFAULT '',
    clock_in TEXT NOT NULL DEFAULT '',
    break_out TEXT NOT NULL DEFAULT '',
    break_in TEXT NOT NULL DEFAULT '',
    clock_out TEXT NOT NULL DEFAULT '',
    is_saturday INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);";

const SELECT_WORK_DAYS: &str = "SELECT id, date, clock_in, break_out, break_in, clock_out,
     is_saturday FROM work_days ORDER BY position";
const DELETE_WORK_DAYS: &str = "DELETE FROM work_days";
const INSERT_WORK_DAY: &str = "INSERT INTO work_days
     (id, position, date, clock_in, break_out, break_in, clock_out, is_saturday)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";
const SELECT_SETTINGS: &str = "SELECT key, value FROM settings ORDER BY key";
const UPSERT_SETTING: &str = "INSERT INTO settings (key, value) VALUES (?1, ?2)
     ON CONFLICT(key) DO UPDATE SET value = excluded.value";

/// Storage backed by a single SQLite database file.
///
/// Record order is kept in an explicit `position` column so a reload returns
/// the exact order that was saved.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens (creating if needed) the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "opened sqlite storage");
        Self::with_connection(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> EngineResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> EngineResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> EngineResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| EngineError::Storage {
            message: "connection lock poisoned".to_string(),
        })
    }
}

impl Storage for SqliteStorage {
    fn load_work_days(&self) -> EngineResult<Vec<DayRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(SELECT_WORK_DAYS)?;
        let rows = stmt.query_map([], |row| {
            Ok(DayRecord {
                id: row.get(0)?,
                date: row.get(1)?,
                clock_in: row.get(2)?,
                break_out: row.get(3)?,
                break_in: row.get(4)?,
                clock_out: row.get(5)?,
                is_saturday: row.get(6)?,
            })
        })?;

        let mut records = Vec::new();
        for record in rows {
            records.push(record?);
        }
        debug!(count = records.len(), "loaded work days");
        Ok(records)
    }

    fn replace_work_days(&self, records: Vec<DayRecord>) -> EngineResult<usize> {
        let (records, dropped) = dedupe_by_id(records);
        if dropped > 0 {
            warn!(dropped, "dropped work days with duplicate ids");
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(DELETE_WORK_DAYS, [])?;
        {
            let mut stmt = tx.prepare(INSERT_WORK_DAY)?;
            for (position, record) in records.iter().enumerate() {
                stmt.execute(params![
                    record.id,
                    position as i64,
                    record.date,
                    record.clock_in,
                    record.break_out,
                    record.break_in,
                    record.clock_out,
                    record.is_saturday,
                ])?;
            }
        }
        tx.commit()?;

        debug!(count = records.len(), "replaced work days");
        Ok(records.len())
    }

    fn load_settings(&self) -> EngineResult<Settings> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(SELECT_SETTINGS)?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut settings = Settings::new();
        for row in rows {
            let (key, raw) = row?;
            let value: Value = serde_json::from_str(&raw)?;
            settings.insert(key, value);
        }
        Ok(settings)
    }

    fn merge_settings(&self, patch: Settings) -> EngineResult<Settings> {
        {
            let mut conn = self.lock()?;
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(UPSERT_SETTING)?;
                for (key, value) in &patch {
                    stmt.execute(params![key, serde_json::to_string(value)?])?;
                }
            }
            tx.commit()?;
        }
        debug!(keys = patch.len(), "merged settings");
        self.load_settings()
    }

    fn is_healthy(&self) -> bool {
        let Ok(conn) = self.lock() else {
            return false;
        };
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)).is_ok()
    }
}
