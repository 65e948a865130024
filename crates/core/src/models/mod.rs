pub mod location;
pub mod provider;
pub mod request;
pub mod update;

pub use location::{Coordinate, Location};
pub use provider::{
    IngestRejection, Provider, ProviderDocument, ProviderRecord, ProviderStatus, RatingField,
};
pub use request::{
    format_date_range, format_hours_minutes, AddressDetails, CaretakerDetails, CaretakerRequest,
    RequestDetails, RequestStatus, ServiceRequest, WalkDetails, WalkRequest,
};
pub use update::{OfferChange, PendingProviderWrite, ProviderGuard, ProviderUpdate, RequestUpdate};

use serde::{Deserialize, Serialize};

/// Caretaker vs dog-walker variant of both requests and providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Caretaker,
    #[serde(rename = "dogwalker")]
    DogWalker,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 2] = [ServiceKind::Caretaker, ServiceKind::DogWalker];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Caretaker => "caretaker",
            ServiceKind::DogWalker => "dogwalker",
        }
    }

    pub fn providers_collection(&self) -> &'static str {
        match self {
            ServiceKind::Caretaker => "caretakers",
            ServiceKind::DogWalker => "dogwalkers",
        }
    }

    pub fn requests_collection(&self) -> &'static str {
        match self {
            ServiceKind::Caretaker => "scheduleRequests",
            ServiceKind::DogWalker => "dogWalkerRequests",
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
