// ABOUTME: Library root for stagehand - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod api;
pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod output;
pub mod store;
pub mod telemetry;
pub mod types;
