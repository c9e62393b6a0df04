//! HTTP API module for the timesheet engine.
//!
//! This module provides the REST endpoints for persisting day-records and
//! settings, probing connectivity, and reading period summaries and trends.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{DEFAULT_TREND_MONTHS, MAX_TREND_MONTHS, SummaryQuery, TrendsQuery};
pub use response::{ApiError, ApiErrorResponse, PingResponse, SaveResponse};
pub use state::AppState;
