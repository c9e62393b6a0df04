//! Calculation logic for the timesheet engine.
//!
//! This module contains the pure calculation core: the `HH:MM` time codec,
//! the per-day hours calculator, period aggregation (sums, overtime value,
//! working days, balance classification) and the monthly trend and insight
//! engine. Nothing here performs I/O.

mod day_hours;
mod period;
mod time_codec;
mod trends;

pub use day_hours::calculate_day_hours;
pub use period::{
    classify_balance, days_in_month, filter_by_month, overtime_value, period_summary, sum_hours,
    working_days_in_month,
};
pub use time_codec::{format_minutes, parse_time};
pub use trends::{
    BALANCE_RATIO, OVERTIME_INCREASE_THRESHOLD_PERCENT, bucket_by_month, derive_insights,
    months_back, trend_report,
};
