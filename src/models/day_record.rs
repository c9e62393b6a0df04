//! Day-record model.
//!
//! This module defines the [`DayRecord`] struct, one calendar day's attendance
//! as entered by the user and persisted by the storage layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One calendar day's attendance entry.
///
/// Times are kept as the raw `HH:MM` strings the user entered; an empty
/// string means the field is unset. Decoding happens in the calculation
/// layer, which treats malformed values as unset.
///
/// # Example
///
/// ```
/// use timesheet_engine::models::DayRecord;
///
/// let json = r#"{
///     "id": 1717430400000,
///     "date": "2024-06-03",
///     "clockIn": "08:00",
///     "breakOut": "12:00",
///     "breakIn": "13:00",
///     "clockOut": "17:00",
///     "isSaturday": false
/// }"#;
///
/// let record: DayRecord = serde_json::from_str(json).unwrap();
/// assert_eq!(record.clock_in, "08:00");
/// assert!(record.is_complete());
/// assert_eq!(record.month(), Some("2024-06"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    /// Unique, creation-time derived identifier (milliseconds since epoch).
    pub id: i64,
    /// Calendar date as an ISO `YYYY-MM-DD` string.
    #[serde(default)]
    pub date: String,
    /// Clock-in time (`HH:MM`), empty when unset.
    #[serde(default)]
    pub clock_in: String,
    /// Start of the break (`HH:MM`), empty when unset.
    #[serde(default)]
    pub break_out: String,
    /// End of the break (`HH:MM`), empty when unset.
    #[serde(default)]
    pub break_in: String,
    /// Clock-out time (`HH:MM`), empty when unset.
    #[serde(default)]
    pub clock_out: String,
    /// Whether the Saturday expected-duration policy applies.
    #[serde(default)]
    pub is_saturday: bool,
}

impl DayRecord {
    /// Creates an empty record for the given date.
    ///
    /// All time fields start unset and the Saturday flag is off, matching
    /// what a freshly added row looks like before the user edits it.
    pub fn new(id: i64, date: NaiveDate) -> Self {
        Self {
            id,
            date: date.format("%Y-%m-%d").to_string(),
            clock_in: String::new(),
            break_out: String::new(),
            break_in: String::new(),
            clock_out: String::new(),
            is_saturday: false,
        }
    }

    /// Returns true when both clock-in and clock-out have been entered.
    pub fn is_complete(&self) -> bool {
        !self.clock_in.is_empty() && !self.clock_out.is_empty()
    }

    /// Returns the `YYYY-MM` prefix of the date, if the date is long enough.
    pub fn month(&self) -> Option<&str> {
        self.date.get(..7)
    }

    /// Returns true when the date starts with `prefix`. An empty prefix matches
    /// every record.
    pub fn matches_prefix(&self, prefix: &str) -> bool {
        self.date.starts_with(prefix)
    }

    /// Parses the date as a calendar date, without any timezone conversion.
    pub fn naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}
