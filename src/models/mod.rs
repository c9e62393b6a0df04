//! Core data models for the timesheet engine.
//!
//! This module contains all the domain models used throughout the engine.

mod day_record;
mod hours;
mod policy;
mod trend;

pub use day_record::DayRecord;
pub use hours::{Balance, BalanceKind, DayHours, HoursTotals, PeriodSummary};
pub use policy::{
    CompensationPolicy, DEFAULT_BILLING_MONTHLY_HOURS, DEFAULT_HOURLY_BASE,
    DEFAULT_OVERTIME_MULTIPLIER, DEFAULT_SATURDAY_DAILY_MINUTES, DEFAULT_STANDARD_DAILY_MINUTES,
};
pub use trend::{Insight, MonthBucket, TrendReport, YearMonth};
