//! Period aggregation.
//!
//! Rolls per-day results into period totals, values overtime in money,
//! counts working days in a month and classifies the period balance.

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;

use crate::models::{
    Balance, BalanceKind, CompensationPolicy, DayRecord, HoursTotals, PeriodSummary, YearMonth,
};

use super::day_hours::calculate_day_hours;
use super::time_codec::format_minutes;

/// Minutes per hour as a decimal, for monetary conversion.
const MINUTES_PER_HOUR: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// Keeps the records whose date starts with `month`.
///
/// An empty `month` keeps every record. Order is preserved.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use timesheet_engine::calculation::filter_by_month;
/// use timesheet_engine::models::DayRecord;
///
/// let records = vec![
///     DayRecord::new(1, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()),
///     DayRecord::new(2, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
/// ];
///
/// let february = filter_by_month(&records, "2024-02");
/// assert_eq!(february.len(), 1);
/// assert_eq!(february[0].id, 2);
/// assert_eq!(filter_by_month(&records, "").len(), 2);
/// ```
pub fn filter_by_month<'a>(records: &'a [DayRecord], month: &str) -> Vec<&'a DayRecord> {
    records
        .iter()
        .filter(|record| record.matches_prefix(month))
        .collect()
}

/// Sums the per-day results over `records`.
///
/// `days_worked` counts records with both clock fields entered, and the
/// average is zero when no day was worked.
///
/// # Example
///
/// ```
/// use timesheet_engine::calculation::sum_hours;
/// use timesheet_engine::models::{CompensationPolicy, DayRecord};
///
/// let mut record = DayRecord::new(1, chrono::NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
/// record.clock_in = "08:00".to_string();
/// record.clock_out = "17:00".to_string();
///
/// let totals = sum_hours(&[record], &CompensationPolicy::default());
/// assert_eq!(totals.total, 540);
/// assert_eq!(totals.overtime, 12);
/// assert_eq!(totals.days_worked, 1);
/// assert_eq!(totals.average_minutes, 540);
/// ```
pub fn sum_hours<'a, I>(records: I, policy: &CompensationPolicy) -> HoursTotals
where
    I: IntoIterator<Item = &'a DayRecord>,
{
    let mut totals = HoursTotals::default();

    for record in records {
        let hours = calculate_day_hours(record, policy);
        totals.total += hours.total;
        totals.overtime += hours.overtime;
        totals.deficit += hours.deficit;
        if record.is_complete() {
            totals.days_worked += 1;
        }
    }

    totals.average_minutes = if totals.days_worked == 0 {
        0
    } else {
        totals.total / i64::from(totals.days_worked)
    };

    totals
}

/// Values overtime minutes in money.
///
/// `(minutes / 60) * (hourly_base / billing_monthly_hours) * overtime_multiplier`,
/// unrounded. Zero billing hours yields zero.
///
/// # Example
///
/// ```
/// use rust_decimal::Decimal;
/// use timesheet_engine::calculation::overtime_value;
/// use timesheet_engine::models::CompensationPolicy;
///
/// let policy = CompensationPolicy {
///     hourly_base: Decimal::new(2200, 0),
///     ..CompensationPolicy::default()
/// };
///
/// // 1h at (2200 / 220) * 1.5
/// assert_eq!(overtime_value(60, &policy), Decimal::new(15, 0));
/// ```
pub fn overtime_value(overtime_minutes: i64, policy: &CompensationPolicy) -> Decimal {
    let hours = Decimal::from(overtime_minutes) / MINUTES_PER_HOUR;
    hours * policy.hourly_rate() * policy.overtime_multiplier
}

/// Returns the number of calendar days in a month, or `0` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .map(|next_first| (next_first - first).num_days() as u32)
        .unwrap_or(0)
}

/// Counts Monday-Friday days in a month.
///
/// Works on calendar dates only, so the result cannot shift with the
/// timezone of the process. An invalid month yields `0`.
///
/// # Example
///
/// ```
/// use timesheet_engine::calculation::working_days_in_month;
///
/// assert_eq!(working_days_in_month(2024, 2), 21);
/// assert_eq!(working_days_in_month(2024, 13), 0);
/// ```
pub fn working_days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };

    first
        .iter_days()
        .take(days_in_month(year, month) as usize)
        .filter(|date| !matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
        .count() as u32
}

/// Classifies `overtime - deficit` as credit, debt or even.
///
/// # Example
///
/// ```
/// use timesheet_engine::calculation::classify_balance;
/// use timesheet_engine::models::BalanceKind;
///
/// let balance = classify_balance(60, 30);
/// assert_eq!(balance.kind, BalanceKind::Credit);
/// assert_eq!(balance.display, "0:30");
/// ```
pub fn classify_balance(overtime_minutes: i64, deficit_minutes: i64) -> Balance {
    let minutes = overtime_minutes - deficit_minutes;
    let kind = match minutes {
        m if m > 0 => BalanceKind::Credit,
        m if m < 0 => BalanceKind::Debt,
        _ => BalanceKind::Even,
    };

    Balance {
        kind,
        minutes,
        display: format_minutes(minutes.abs()),
        label: kind.label().to_string(),
        description: kind.description().to_string(),
    }
}

/// Builds the summary for the records matching `month` (all when `None` or empty).
pub fn period_summary(
    records: &[DayRecord],
    month: Option<&str>,
    policy: &CompensationPolicy,
) -> PeriodSummary {
    let month = month.filter(|m| !m.is_empty());
    let subset = filter_by_month(records, month.unwrap_or(""));
    let totals = sum_hours(subset.iter().copied(), policy);

    let working_days = month
        .and_then(|m| m.parse::<YearMonth>().ok())
        .map(|ym| working_days_in_month(ym.year(), ym.month()));

    PeriodSummary {
        month: month.map(str::to_string),
        record_count: subset.len(),
        overtime_value: overtime_value(totals.overtime, policy),
        balance: classify_balance(totals.overtime, totals.deficit),
        totals,
        working_days,
    }
}
