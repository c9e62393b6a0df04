//! Request types for the timesheet API.
//!
//! Bodies for `/work-days` and `/settings` are the domain types themselves;
//! this module holds the query strings of the reporting endpoints.

use serde::{Deserialize, Serialize};

use crate::models::YearMonth;

use super::response::ApiError;

/// Default trailing window for `GET /trends`.
pub const DEFAULT_TREND_MONTHS: u32 = 6;

/// Largest trailing window accepted by `GET /trends`.
pub const MAX_TREND_MONTHS: u32 = 24;

/// Query string of `GET /summary`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryQuery {
    /// `YYYY-MM` month to report on; all records when absent or empty.
    #[serde(default)]
    pub month: Option<String>,
}

impl SummaryQuery {
    /// Validated month filter, `None` meaning the whole collection.
    pub fn month(&self) -> Result<Option<YearMonth>, ApiError> {
        match self.month.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse::<YearMonth>().map(Some).map_err(|_| {
                ApiError::validation_error(format!("month must be YYYY-MM, got '{}'", raw))
            }),
        }
    }
}

/// Query string of `GET /trends`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendsQuery {
    /// Number of trailing months, including the current one.
    #[serde(default)]
    pub months: Option<u32>,
}

impl TrendsQuery {
    /// Validated window size.
    pub fn months(&self) -> Result<u32, ApiError> {
        let months = self.months.unwrap_or(DEFAULT_TREND_MONTHS);
        if !(1..=MAX_TREND_MONTHS).contains(&months) {
            return Err(ApiError::validation_error(format!(
                "months must be between 1 and {}, got {}",
                MAX_TREND_MONTHS, months
            )));
        }
        Ok(months)
    }
}
