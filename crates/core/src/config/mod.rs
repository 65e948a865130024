//! Configuration for the assignment service.
//!
//! `AppConfig::load` layers built-in defaults, an optional TOML file and
//! `SNUFFY_`-prefixed environment variables, then validates the result.

pub mod models;


pub use models::{AppConfig, AssignmentConfig, ObservabilityConfig};
