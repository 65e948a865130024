pub mod config;
pub mod errors;
pub mod geo;
pub mod logging;
pub mod models;
pub mod traits;

pub use config::{AppConfig, AssignmentConfig, ObservabilityConfig};
pub use errors::*;
pub use logging::{LogConfig, LogLevel, OutputFormat};
pub use models::{
    AddressDetails, CaretakerRequest, Coordinate, Location, PendingProviderWrite, Provider,
    ProviderDocument, ProviderStatus, ProviderUpdate, RequestStatus, RequestUpdate, ServiceKind,
    ServiceRequest, WalkRequest,
};
pub use traits::{
    AssignmentStore, ProviderStore, RequestStore, ScoringStrategy, StoreResult, UserDirectory,
};
