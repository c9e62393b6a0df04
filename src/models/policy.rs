//! Compensation policy model.
//!
//! The [`CompensationPolicy`] holds the expected daily durations and the
//! figures used to turn overtime minutes into money.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Expected minutes for a regular weekday (8h48).
pub const DEFAULT_STANDARD_DAILY_MINUTES: i64 = 8 * 60 + 48;

/// Expected minutes for a day flagged as Saturday (8h).
pub const DEFAULT_SATURDAY_DAILY_MINUTES: i64 = 8 * 60;

/// Default monthly base used to derive the hourly rate.
pub const DEFAULT_HOURLY_BASE: Decimal = Decimal::from_parts(162575, 0, 0, false, 2);

/// Default overtime multiplier (150%).
pub const DEFAULT_OVERTIME_MULTIPLIER: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Default number of billable hours per month.
pub const DEFAULT_BILLING_MONTHLY_HOURS: Decimal = Decimal::from_parts(220, 0, 0, false, 0);

/// Configuration mapping worked minutes to expectations and money.
///
/// Missing fields fall back to the defaults, so a partial settings blob such
/// as `{"overtimeMultiplier": 2}` is a valid policy.
///
/// # Example
///
/// ```
/// use timesheet_engine::models::CompensationPolicy;
///
/// let policy = CompensationPolicy::default();
/// assert_eq!(policy.expected_minutes(false), 528);
/// assert_eq!(policy.expected_minutes(true), 480);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompensationPolicy {
    /// Expected minutes on a regular day.
    pub standard_daily_minutes: i64,
    /// Expected minutes on a day flagged as Saturday.
    pub saturday_daily_minutes: i64,
    /// Monthly base amount divided by `billing_monthly_hours` to get the hourly rate.
    pub hourly_base: Decimal,
    /// Multiplier applied to the hourly rate for overtime.
    pub overtime_multiplier: Decimal,
    /// Billable hours per month.
    pub billing_monthly_hours: Decimal,
}

impl Default for CompensationPolicy {
    fn default() -> Self {
        Self {
            standard_daily_minutes: DEFAULT_STANDARD_DAILY_MINUTES,
            saturday_daily_minutes: DEFAULT_SATURDAY_DAILY_MINUTES,
            hourly_base: DEFAULT_HOURLY_BASE,
            overtime_multiplier: DEFAULT_OVERTIME_MULTIPLIER,
            billing_monthly_hours: DEFAULT_BILLING_MONTHLY_HOURS,
        }
    }
}

impl CompensationPolicy {
    /// Returns the expected minutes for a day with the given Saturday flag.
    pub fn expected_minutes(&self, is_saturday: bool) -> i64 {
        if is_saturday {
            self.saturday_daily_minutes
        } else {
            self.standard_daily_minutes
        }
    }

    /// Returns the plain hourly rate, or zero when billing hours are zero.
    pub fn hourly_rate(&self) -> Decimal {
        if self.billing_monthly_hours.is_zero() {
            return Decimal::ZERO;
        }
        self.hourly_base / self.billing_monthly_hours
    }

    /// Checks that the policy can be used for reporting.
    ///
    /// The calculation functions accept any policy; validation only guards
    /// configuration files and settings submitted by users.
    pub fn validate(&self) -> EngineResult<()> {
        if self.standard_daily_minutes <= 0 {
            return Err(invalid("standardDailyMinutes", "must be greater than zero"));
        }
        if self.saturday_daily_minutes <= 0 {
            return Err(invalid("saturdayDailyMinutes", "must be greater than zero"));
        }
        if self.billing_monthly_hours <= Decimal::ZERO {
            return Err(invalid("billingMonthlyHours", "must be greater than zero"));
        }
        if self.hourly_base.is_sign_negative() {
            return Err(invalid("hourlyBase", "must not be negative"));
        }
        if self.overtime_multiplier.is_sign_negative() {
            return Err(invalid("overtimeMultiplier", "must not be negative"));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> EngineError {
    EngineError::InvalidPolicy {
        field: field.to_string(),
        message: message.to_string(),
    }
}
