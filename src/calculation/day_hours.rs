//! Per-day hours calculation.
//!
//! Turns the four raw clock readings of a [`DayRecord`] into worked, overtime
//! and deficit minutes against the expected duration of the day.

use crate::models::{CompensationPolicy, DayHours, DayRecord};

use super::time_codec::parse_time;

/// Calculates worked, overtime and deficit minutes for one day.
///
/// # Rules
///
/// - A day whose clock-in or clock-out decodes to `0` (unset or malformed) is
///   incomplete and contributes nothing.
/// - The break is subtracted only when both break fields decode to non-zero
///   values; a lone break field is ignored.
/// - The expected duration is the Saturday one when `is_saturday` is set.
/// - No clamping: clocking out before clocking in yields a negative total and
///   a matching deficit.
///
/// # Examples
///
/// ```
/// use timesheet_engine::calculation::calculate_day_hours;
/// use timesheet_engine::models::{CompensationPolicy, DayRecord};
///
/// let record = DayRecord {
///     id: 1,
///     date: "2024-06-03".to_string(),
///     clock_in: "08:00".to_string(),
///     break_out: "12:00".to_string(),
///     break_in: "13:00".to_string(),
///     clock_out: "16:00".to_string(),
///     is_saturday: false,
/// };
///
/// let hours = calculate_day_hours(&record, &CompensationPolicy::default());
/// assert_eq!(hours.total, 420);
/// assert_eq!(hours.overtime, 0);
/// assert_eq!(hours.deficit, 108);
/// ```
pub fn calculate_day_hours(record: &DayRecord, policy: &CompensationPolicy) -> DayHours {
    let clock_in = parse_time(&record.clock_in);
    let break_out = parse_time(&record.break_out);
    let break_in = parse_time(&record.break_in);
    let clock_out = parse_time(&record.clock_out);

    if clock_in == 0 || clock_out == 0 {
        return DayHours::ZERO;
    }

    let mut total = clock_out - clock_in;

    if break_out != 0 && break_in != 0 {
        total -= break_in - break_out;
    }

    let expected = policy.expected_minutes(record.is_saturday);
    let difference = total - expected;

    DayHours {
        total,
        overtime: difference.max(0),
        deficit: (-difference).max(0),
    }
}
