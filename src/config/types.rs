//! Configuration types for the timesheet engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use std::path::PathBuf;

use serde::Deserialize;

use crate::models::CompensationPolicy;

/// HTTP server settings.
///
/// Every field is optional in `server.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP server binds to.
    pub bind_address: String,
    /// Path of the SQLite database file.
    pub database_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            database_path: PathBuf::from("timesheet.db"),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    policy: CompensationPolicy,
    server: ServerConfig,
}

impl AppConfig {
    /// Creates a new application configuration.
    pub fn new(policy: CompensationPolicy, server: ServerConfig) -> Self {
        Self { policy, server }
    }

    /// Returns the default compensation policy.
    pub fn policy(&self) -> &CompensationPolicy {
        &self.policy
    }

    /// Returns the server settings.
    pub fn server(&self) -> &ServerConfig {
        &self.server
    }
}
