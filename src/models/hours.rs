//! Hours result models.
//!
//! This module contains the per-day result ([`DayHours`]), the aggregated
//! period totals ([`HoursTotals`]), the balance classification ([`Balance`])
//! and the bundled [`PeriodSummary`] a reporting surface renders.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Worked, overtime and deficit minutes for one day.
///
/// For a complete day `total - expected == overtime - deficit`; for an
/// incomplete day all three are zero.
///
/// # Example
///
/// ```
/// use timesheet_engine::models::DayHours;
///
/// let hours = DayHours { total: 540, overtime: 12, deficit: 0 };
/// assert_eq!(hours.balance(), 12);
/// assert_eq!(DayHours::ZERO.total, 0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    /// Worked minutes (clock span minus break), may be negative.
    pub total: i64,
    /// Minutes above the expected duration.
    pub overtime: i64,
    /// Minutes below the expected duration.
    pub deficit: i64,
}

impl DayHours {
    /// The contribution of an incomplete day.
    pub const ZERO: DayHours = DayHours {
        total: 0,
        overtime: 0,
        deficit: 0,
    };

    /// Returns `overtime - deficit`.
    pub fn balance(&self) -> i64 {
        self.overtime - self.deficit
    }
}

/// Sums of [`DayHours`] over a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoursTotals {
    /// Sum of worked minutes.
    pub total: i64,
    /// Sum of overtime minutes.
    pub overtime: i64,
    /// Sum of deficit minutes.
    pub deficit: i64,
    /// Number of records with both clock-in and clock-out set.
    pub days_worked: u32,
    /// `total / days_worked`, truncated; zero when no day was worked.
    pub average_minutes: i64,
}

/// Sign of a period balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceKind {
    /// More overtime than deficit.
    Credit,
    /// More deficit than overtime.
    Debt,
    /// Overtime and deficit cancel out.
    Even,
}

impl BalanceKind {
    /// Fixed label shared by summary and report surfaces.
    pub fn label(&self) -> &'static str {
        match self {
            BalanceKind::Credit => "credit",
            BalanceKind::Debt => "debt",
            BalanceKind::Even => "even",
        }
    }

    /// Short description of what the balance means for the user.
    pub fn description(&self) -> &'static str {
        match self {
            BalanceKind::Credit => "Hours in your favor",
            BalanceKind::Debt => "Hours to make up",
            BalanceKind::Even => "Balance settled",
        }
    }
}

impl std::fmt::Display for BalanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A classified period balance.
///
/// `display` holds the absolute balance formatted as `H:MM`, so a debt of
/// 45 minutes is shown as `0:45` next to the `debt` label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    /// The classification.
    pub kind: BalanceKind,
    /// Signed balance in minutes (`overtime - deficit`).
    pub minutes: i64,
    /// Absolute balance formatted as `H:MM`.
    pub display: String,
    /// Fixed label for the classification.
    pub label: String,
    /// Short description for the classification.
    pub description: String,
}

/// Everything a summary surface needs for one subset of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    /// The month filter used (`YYYY-MM`), or `None` for all records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    /// Number of records in the subset.
    pub record_count: usize,
    /// Aggregated minutes.
    pub totals: HoursTotals,
    /// Monetary value of the overtime, unrounded.
    pub overtime_value: Decimal,
    /// Balance classification.
    pub balance: Balance,
    /// Monday-Friday count for the month filter, when it names a valid month.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_days: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_hours_balance() {
        let hours = DayHours {
            total: 420,
            overtime: 0,
            deficit: 108,
        };
        assert_eq!(hours.balance(), -108);
    }

    #[test]
    fn test_balance_kind_labels_are_fixed() {
        assert_eq!(BalanceKind::Credit.label(), "credit");
        assert_eq!(BalanceKind::Debt.label(), "debt");
        assert_eq!(BalanceKind::Even.label(), "even");
        assert_eq!(BalanceKind::Debt.to_string(), "debt");
    }

    #[test]
    fn test_totals_serialize_camel_case() {
        let totals = HoursTotals {
            total: 60,
            overtime: 0,
            deficit: 0,
            days_worked: 1,
            average_minutes: 60,
        };
        let json = serde_json::to_string(&totals).unwrap();
        assert!(json.contains("\"daysWorked\":1"));
        assert!(json.contains("\"averageMinutes\":60"));
    }
}
