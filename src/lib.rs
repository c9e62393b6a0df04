//! Personal timesheet engine.
//!
//! This crate turns daily clock readings into worked, overtime and deficit
//! minutes, aggregates them per month with a monetary value for overtime,
//! derives multi-month trend insights, and exposes the record collection over
//! a small REST API with a retrying client.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
