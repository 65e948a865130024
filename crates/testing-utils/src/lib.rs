//! # Snuffy Testing Utils
//!
//! Shared testing utilities for the assignment workspace: document builders,
//! a fault-injecting store wrapper and common setup helpers.
//!
//! ```toml
//! [dev-dependencies]
//! snuffy-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

pub use builders::*;
pub use helpers::*;
pub use mocks::*;
