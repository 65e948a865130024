//! Observability module
//!
//! Structured log events and metrics counters for the assignment flow.

pub mod metrics_collector;
pub mod structured_logger;

pub use metrics_collector::MetricsCollector;
pub use structured_logger::StructuredLogger;
