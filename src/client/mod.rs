//! Client side of the timesheet REST API.
//!
//! [`TimesheetClient`] wraps every call in a [`RetryPolicy`] and, when given a
//! [`LocalBackup`], keeps unsaved data on disk until the server is back.
//! [`Heartbeat`] reports connectivity in the background.

mod backup;
mod heartbeat;
mod http;
mod retry;

pub use backup::LocalBackup;
pub use heartbeat::{Connectivity, DEFAULT_HEARTBEAT_INTERVAL, Heartbeat};
pub use http::{LoadSource, LoadedWorkDays, TimesheetClient};
pub use retry::RetryPolicy;
