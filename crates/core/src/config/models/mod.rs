pub mod app_config;
pub mod assignment;
pub mod observability;

pub use app_config::AppConfig;
pub use assignment::AssignmentConfig;
pub use observability::ObservabilityConfig;
