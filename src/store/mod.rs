//! Record collection and persistence.
//!
//! [`RecordStore`] is the in-memory collection the UI layer edits. The
//! [`Storage`] trait is the persistence boundary the HTTP API writes through,
//! with [`SqliteStorage`] for real deployments and [`MemoryStorage`] for tests.

mod record_store;
mod sqlite;
mod storage;

pub use record_store::{FieldUpdate, RecordStore, dedupe_by_id};
pub use sqlite::SqliteStorage;
pub use storage::{MemoryStorage, POLICY_SETTINGS_KEY, Settings, Storage};
