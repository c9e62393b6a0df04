//! In-memory ordered collection of day-records.
//!
//! [`RecordStore`] owns identity, display order and month filtering. Callers
//! mutate it, then hand its records to the calculation functions and persist
//! the whole collection.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::DayRecord;

/// A single-field edit of a day-record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    /// Sets the date; the store re-sorts by date afterwards.
    Date(String),
    /// Sets the clock-in time.
    ClockIn(String),
    /// Sets the start of the break.
    BreakOut(String),
    /// Sets the end of the break.
    BreakIn(String),
    /// Sets the clock-out time.
    ClockOut(String),
    /// Sets the Saturday flag.
    IsSaturday(bool),
}

/// Ordered, identity-keyed collection of [`DayRecord`]s.
///
/// Display order is user controlled through [`RecordStore::move_up`] and
/// [`RecordStore::move_down`]; the store only re-sorts by date after an
/// insertion or a date edit.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use timesheet_engine::store::{FieldUpdate, RecordStore};
///
/// let mut store = RecordStore::new();
/// let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
/// let id = store.add_day(today, 1_717_400_000_000);
///
/// store.update_field(id, FieldUpdate::ClockIn("08:00".to_string())).unwrap();
/// assert_eq!(store.get(id).unwrap().clock_in, "08:00");
/// assert_eq!(store.months(), vec!["2024-06".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    records: Vec<DayRecord>,
    // Highest id ever held or issued; survives removals.
    last_issued: Option<i64>,
}

impl RecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from previously persisted records.
    pub fn from_records(records: Vec<DayRecord>) -> Self {
        let mut store = Self::new();
        store.load(records);
        store
    }

    /// Replaces the contents with `records`, keeping their order.
    ///
    /// Records repeating an id already seen are dropped; the number dropped
    /// is returned. The id high-water mark only ever rises.
    pub fn load(&mut self, records: Vec<DayRecord>) -> usize {
        let (records, dropped) = dedupe_by_id(records);
        self.last_issued = self.last_issued.max(records.iter().map(|r| r.id).max());
        self.records = records;
        dropped
    }

    /// All records in display order.
    pub fn records(&self) -> &[DayRecord] {
        &self.records
    }

    /// Consumes the store, returning the records in display order.
    pub fn into_records(self) -> Vec<DayRecord> {
        self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up a record by id.
    pub fn get(&self, id: i64) -> Option<&DayRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Appends an empty record dated `today` and re-sorts by date.
    ///
    /// The id is `now_millis`, bumped past the largest id this store has
    /// ever held when the clock would collide with or go behind it. Ids of
    /// removed records are never handed out again.
    pub fn add_day(&mut self, today: NaiveDate, now_millis: i64) -> i64 {
        let next_free = self
            .last_issued
            .map_or(i64::MIN, |last| last.saturating_add(1));
        let id = now_millis.max(next_free);
        self.last_issued = Some(id);

        self.records.push(DayRecord::new(id, today));
        self.sort_by_date();
        debug!(id, date = %today, "day record added");
        id
    }

    /// Applies a single-field edit to the record with `id`.
    pub fn update_field(&mut self, id: i64, update: FieldUpdate) -> EngineResult<()> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(EngineError::RecordNotFound { id })?;

        let resort = matches!(update, FieldUpdate::Date(_));
        match update {
            FieldUpdate::Date(value) => record.date = value,
            FieldUpdate::ClockIn(value) => record.clock_in = value,
            FieldUpdate::BreakOut(value) => record.break_out = value,
            FieldUpdate::BreakIn(value) => record.break_in = value,
            FieldUpdate::ClockOut(value) => record.clock_out = value,
            FieldUpdate::IsSaturday(value) => record.is_saturday = value,
        }

        if resort {
            self.sort_by_date();
        }
        Ok(())
    }

    /// Removes the record with `id`.
    pub fn remove(&mut self, id: i64) -> EngineResult<DayRecord> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(EngineError::RecordNotFound { id })?;
        Ok(self.records.remove(index))
    }

    /// Removes every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Swaps the record with its predecessor in the view for `filter`.
    ///
    /// Returns false when the record is first in the view or not in it.
    pub fn move_up(&mut self, id: i64, filter: &str) -> bool {
        self.swap_in_view(id, filter, Direction::Up)
    }

    /// Swaps the record with its successor in the view for `filter`.
    ///
    /// Returns false when the record is last in the view or not in it.
    pub fn move_down(&mut self, id: i64, filter: &str) -> bool {
        self.swap_in_view(id, filter, Direction::Down)
    }

    /// Records whose date starts with `filter`, in display order.
    pub fn view(&self, filter: &str) -> Vec<&DayRecord> {
        self.records
            .iter()
            .filter(|r| r.matches_prefix(filter))
            .collect()
    }

    /// Distinct `YYYY-MM` months present, newest first.
    pub fn months(&self) -> Vec<String> {
        let months: BTreeSet<&str> = self.records.iter().filter_map(|r| r.month()).collect();
        months.into_iter().rev().map(str::to_string).collect()
    }

    fn sort_by_date(&mut self) {
        // Stable, so records sharing a date keep their relative order.
        self.records.sort_by(|a, b| a.date.cmp(&b.date));
    }

    fn swap_in_view(&mut self, id: i64, filter: &str, direction: Direction) -> bool {
        let view: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.matches_prefix(filter))
            .map(|(index, _)| index)
            .collect();

        let Some(position) = view.iter().position(|&index| self.records[index].id == id) else {
            return false;
        };

        let neighbour = match direction {
            Direction::Up => position.checked_sub(1),
            Direction::Down => Some(position + 1).filter(|&p| p < view.len()),
        };

        match neighbour {
            Some(other) => {
                self.records.swap(view[position], view[other]);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Up,
    Down,
}

/// Drops records whose id was already seen, keeping the first occurrence.
///
/// Returns the surviving records in their original order and how many were
/// dropped.
pub fn dedupe_by_id(records: Vec<DayRecord>) -> (Vec<DayRecord>, usize) {
    let before = records.len();
    let mut seen = HashSet::with_capacity(before);
    let kept: Vec<DayRecord> = records.into_iter().filter(|r| seen.insert(r.id)).collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(id: i64, date: &str) -> DayRecord {
        DayRecord {
            id,
            date: date.to_string(),
            clock_in: String::new(),
            break_out: String::new(),
            break_in: String::new(),
            clock_out: String::new(),
            is_saturday: false,
        }
    }

    fn ids(store: &RecordStore) -> Vec<i64> {
        store.records().iter().map(|r| r.id).collect()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_add_day_sorts_by_date() {
        let mut store = RecordStore::from_records(vec![
            make_record(1, "2024-06-01"),
            make_record(2, "2024-06-10"),
        ]);
        let id = store.add_day(date("2024-06-05"), 100);

        assert_eq!(id, 100);
        assert_eq!(ids(&store), vec![1, 100, 2]);
        assert_eq!(store.get(id).unwrap().date, "2024-06-05");
    }

    #[test]
    fn test_add_day_bumps_id_when_clock_lags() {
        let mut store = RecordStore::from_records(vec![make_record(500, "2024-06-01")]);

        let first = store.add_day(date("2024-06-02"), 10);
        assert_eq!(first, 501);

        let second = store.add_day(date("2024-06-02"), 10);
        assert_eq!(second, 502);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_add_day_never_reissues_removed_id() {
        let mut store = RecordStore::new();
        let today = date("2024-06-03");

        assert_eq!(store.add_day(today, 10), 10);
        let newest = store.add_day(today, 10);
        assert_eq!(newest, 11);

        store.remove(newest).unwrap();
        let next = store.add_day(today, 10);
        assert_ne!(next, newest);
        assert_eq!(next, 12);
    }

    #[test]
    fn test_cleared_store_keeps_id_high_water_mark() {
        let mut store = RecordStore::from_records(vec![make_record(40, "2024-06-01")]);
        store.clear();

        assert_eq!(store.add_day(date("2024-06-02"), 5), 41);
    }

    #[test]
    fn test_update_field_sets_values() {
        let mut store = RecordStore::from_records(vec![make_record(1, "2024-06-01")]);
        store
            .update_field(1, FieldUpdate::ClockIn("08:00".to_string()))
            .unwrap();
        store
            .update_field(1, FieldUpdate::BreakOut("12:00".to_string()))
            .unwrap();
        store
            .update_field(1, FieldUpdate::BreakIn("13:00".to_string()))
            .unwrap();
        store
            .update_field(1, FieldUpdate::ClockOut("17:00".to_string()))
            .unwrap();
        store.update_field(1, FieldUpdate::IsSaturday(true)).unwrap();

        let record = store.get(1).unwrap();
        assert_eq!(record.clock_in, "08:00");
        assert_eq!(record.break_out, "12:00");
        assert_eq!(record.break_in, "13:00");
        assert_eq!(record.clock_out, "17:00");
        assert!(record.is_saturday);
    }

    #[test]
    fn test_time_edit_does_not_resort() {
        let mut store = RecordStore::from_records(vec![
            make_record(2, "2024-06-10"),
            make_record(1, "2024-06-01"),
        ]);
        store
            .update_field(2, FieldUpdate::ClockIn("08:00".to_string()))
            .unwrap();
        assert_eq!(ids(&store), vec![2, 1]);
    }

    #[test]
    fn test_date_edit_resorts() {
        let mut store = RecordStore::from_records(vec![
            make_record(1, "2024-06-01"),
            make_record(2, "2024-06-10"),
        ]);
        store
            .update_field(1, FieldUpdate::Date("2024-06-20".to_string()))
            .unwrap();
        assert_eq!(ids(&store), vec![2, 1]);
    }

    #[test]
    fn test_update_unknown_id_fails() {
        let mut store = RecordStore::new();
        let result = store.update_field(9, FieldUpdate::IsSaturday(true));
        assert!(matches!(result, Err(EngineError::RecordNotFound { id: 9 })));
    }

    #[test]
    fn test_remove() {
        let mut store = RecordStore::from_records(vec![
            make_record(1, "2024-06-01"),
            make_record(2, "2024-06-02"),
        ]);
        let removed = store.remove(1).unwrap();
        assert_eq!(removed.id, 1);
        assert_eq!(ids(&store), vec![2]);
        assert!(store.remove(1).is_err());
    }

    #[test]
    fn test_clear() {
        let mut store = RecordStore::from_records(vec![make_record(1, "2024-06-01")]);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_move_up_and_down_without_filter() {
        let mut store = RecordStore::from_records(vec![
            make_record(1, "2024-06-01"),
            make_record(2, "2024-06-02"),
            make_record(3, "2024-06-03"),
        ]);

        assert!(store.move_up(3, ""));
        assert_eq!(ids(&store), vec![1, 3, 2]);

        assert!(store.move_down(1, ""));
        assert_eq!(ids(&store), vec![3, 1, 2]);
    }

    #[test]
    fn test_move_at_edges_is_noop() {
        let mut store = RecordStore::from_records(vec![
            make_record(1, "2024-06-01"),
            make_record(2, "2024-06-02"),
        ]);
        assert!(!store.move_up(1, ""));
        assert!(!store.move_down(2, ""));
        assert!(!store.move_up(99, ""));
        assert_eq!(ids(&store), vec![1, 2]);
    }

    #[test]
    fn test_move_within_filtered_view_swaps_view_neighbours() {
        let mut store = RecordStore::from_records(vec![
            make_record(1, "2024-05-30"),
            make_record(2, "2024-06-01"),
            make_record(3, "2024-05-31"),
            make_record(4, "2024-06-02"),
        ]);

        // In the June view, 4 sits right after 2 even though 3 is between them.
        assert!(store.move_up(4, "2024-06"));
        assert_eq!(ids(&store), vec![1, 4, 3, 2]);

        // 4 is now first in the June view.
        assert!(!store.move_up(4, "2024-06"));
    }

    #[test]
    fn test_view_and_months() {
        let store = RecordStore::from_records(vec![
            make_record(1, "2024-05-30"),
            make_record(2, "2024-06-01"),
            make_record(3, ""),
            make_record(4, "2023-12-31"),
        ]);

        let june: Vec<i64> = store.view("2024-06").iter().map(|r| r.id).collect();
        assert_eq!(june, vec![2]);
        assert_eq!(store.view("").len(), 4);
        assert_eq!(store.months(), vec!["2024-06", "2024-05", "2023-12"]);
    }

    #[test]
    fn test_load_drops_duplicate_ids() {
        let mut store = RecordStore::new();
        let dropped = store.load(vec![
            make_record(1, "2024-06-01"),
            make_record(1, "2024-06-09"),
            make_record(2, "2024-06-02"),
        ]);
        assert_eq!(dropped, 1);
        assert_eq!(ids(&store), vec![1, 2]);
        assert_eq!(store.get(1).unwrap().date, "2024-06-01");
    }
}
