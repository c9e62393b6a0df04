//! Application state for the timesheet API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::warn;

use crate::config::ConfigLoader;
use crate::models::CompensationPolicy;
use crate::store::{POLICY_SETTINGS_KEY, Settings, Storage};

/// Shared application state.
///
/// Holds the loaded configuration and the storage backend.
#[derive(Clone)]
pub struct AppState {
    /// The loaded configuration.
    config: Arc<ConfigLoader>,
    /// Persistence backend.
    storage: Arc<dyn Storage>,
    /// Fixed reporting date; the local date when `None`.
    today: Option<NaiveDate>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(config: ConfigLoader, storage: Arc<dyn Storage>) -> Self {
        Self {
            config: Arc::new(config),
            storage,
            today: None,
        }
    }

    /// Pins the date used as "today" by trend reports.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns a handle to the storage backend.
    pub fn storage(&self) -> Arc<dyn Storage> {
        Arc::clone(&self.storage)
    }

    /// The reporting date.
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Resolves the policy to report with.
    ///
    /// A valid policy stored under the `compensationPolicy` settings key wins;
    /// otherwise the configured default applies.
    pub fn effective_policy(&self, settings: &Settings) -> CompensationPolicy {
        let default = self.config.policy();
        let Some(stored) = settings.get(POLICY_SETTINGS_KEY) else {
            return default.clone();
        };

        match serde_json::from_value::<CompensationPolicy>(stored.clone()) {
            Ok(policy) if policy.validate().is_ok() => policy,
            Ok(_) | Err(_) => {
                warn!("stored compensation policy is unusable, using configured default");
                default.clone()
            }
        }
    }
}
