//! Snuffy dispatch: provider assignment for pet-sitting and dog-walking
//! requests.
//!
//! The root crate wires configuration, logging, the store and the
//! [`AssignmentEngine`] together. The engine itself lives in
//! `snuffy-dispatcher`; models and contracts in `snuffy-core`.

pub mod app;
pub mod common;

pub use app::Application;
pub use common::{init_logging, init_logging_from, load_config};
pub use snuffy_core::{AppConfig, AssignmentError, AssignmentResult, ServiceKind};
pub use snuffy_dispatcher::{AssignmentEngine, Offer};
