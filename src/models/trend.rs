//! Trend models.
//!
//! This module contains the calendar month key ([`YearMonth`]), the dense
//! per-month aggregate ([`MonthBucket`]), the heuristic [`Insight`] values and
//! the bundled [`TrendReport`].

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::format_minutes;

/// A calendar year-month, serialized as `YYYY-MM`.
///
/// # Example
///
/// ```
/// use timesheet_engine::models::YearMonth;
///
/// let month: YearMonth = "2024-02".parse().unwrap();
/// assert_eq!(month.to_string(), "2024-02");
/// assert_eq!(month.previous().to_string(), "2024-01");
/// assert_eq!(YearMonth::new(2024, 1).unwrap().previous().to_string(), "2023-12");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Creates a year-month, returning `None` when `month` is outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Returns the year-month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month number, `1..=12`.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Returns the month before this one.
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Returns the `YYYY-MM` prefix used to match record dates.
    pub fn prefix(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got '{}'", s))?;
        if year.len() != 4 || month.len() != 2 {
            return Err(format!("expected YYYY-MM, got '{}'", s));
        }
        let year: i32 = year
            .parse()
            .map_err(|_| format!("invalid year in '{}'", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("invalid month in '{}'", s))?;
        YearMonth::new(year, month).ok_or_else(|| format!("month out of range in '{}'", s))
    }
}

impl TryFrom<String> for YearMonth {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// Aggregates for one calendar month of a trend window.
///
/// Months without records still appear with zero values so chart series stay
/// dense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    /// The month this bucket covers.
    pub month: YearMonth,
    /// Sum of worked minutes.
    pub total: i64,
    /// Sum of overtime minutes.
    pub overtime: i64,
    /// Sum of deficit minutes.
    pub deficit: i64,
    /// Number of records dated in the month.
    pub day_count: u32,
    /// Number of those records with both clock-in and clock-out set.
    pub days_worked: u32,
}

impl MonthBucket {
    /// Creates an empty bucket for `month`.
    pub fn empty(month: YearMonth) -> Self {
        Self {
            month,
            total: 0,
            overtime: 0,
            deficit: 0,
            day_count: 0,
            days_worked: 0,
        }
    }

    /// Returns true when at least one record fell into this month.
    pub fn has_data(&self) -> bool {
        self.day_count > 0
    }
}

/// A qualitative observation derived from a trend window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Insight {
    /// Fewer than two months in the window have any records.
    InsufficientData,
    /// Overtime is more than twice the deficit across the window.
    PositiveBalance {
        /// Overtime minutes in the window.
        overtime: i64,
        /// Deficit minutes in the window.
        deficit: i64,
    },
    /// Deficit is more than twice the overtime across the window.
    NegativeBalance {
        /// Overtime minutes in the window.
        overtime: i64,
        /// Deficit minutes in the window.
        deficit: i64,
    },
    /// The latest month's overtime grew more than 20% over the month before.
    OvertimeIncrease {
        /// Overtime minutes in the prior month.
        previous: i64,
        /// Overtime minutes in the latest month.
        current: i64,
        /// Growth in percent, one decimal place.
        percent: Decimal,
    },
    /// The average worked day is longer than the expected duration.
    AboveExpected {
        /// Average worked minutes per worked day.
        average_minutes: i64,
        /// Expected minutes per day.
        expected_minutes: i64,
        /// `average_minutes - expected_minutes`.
        delta_minutes: i64,
    },
}

impl Insight {
    /// Human-readable text for the insight.
    pub fn message(&self) -> String {
        match self {
            Insight::InsufficientData => {
                "Not enough data yet: record at least two months to see trends".to_string()
            }
            Insight::PositiveBalance { overtime, deficit } => format!(
                "Positive balance: {} of overtime against {} of deficit",
                format_minutes(*overtime),
                format_minutes(*deficit)
            ),
            Insight::NegativeBalance { overtime, deficit } => format!(
                "Watch out: {} of deficit against only {} of overtime",
                format_minutes(*deficit),
                format_minutes(*overtime)
            ),
            Insight::OvertimeIncrease { percent, .. } => {
                format!("Overtime rose {}% compared with the previous month", percent)
            }
            Insight::AboveExpected { delta_minutes, .. } => format!(
                "Your average day is {} above the expected duration",
                format_minutes(*delta_minutes)
            ),
        }
    }
}

/// Buckets plus the insights derived from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    /// One bucket per month, oldest first.
    pub months: Vec<MonthBucket>,
    /// Insights in evaluation order.
    pub insights: Vec<Insight>,
}
