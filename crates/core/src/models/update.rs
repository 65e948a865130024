use serde::{Deserialize, Serialize};

use super::{ProviderStatus, RequestStatus, ServiceKind};

/// Field changes applied to a request document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestUpdate {
    pub status: Option<RequestStatus>,
    /// `Some(None)` clears the field.
    pub assigned_provider_id: Option<Option<String>>,
}

impl RequestUpdate {
    pub fn offer(provider_id: impl Into<String>) -> Self {
        Self {
            status: Some(RequestStatus::Pending),
            assigned_provider_id: Some(Some(provider_id.into())),
        }
    }

    pub fn status(status: RequestStatus) -> Self {
        Self {
            status: Some(status),
            assigned_provider_id: None,
        }
    }

    /// Restores both fields to the given values.
    pub fn restore(status: RequestStatus, assigned_provider_id: Option<String>) -> Self {
        Self {
            status: Some(status),
            assigned_provider_id: Some(assigned_provider_id),
        }
    }
}

/// Change to the provider's single live offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OfferChange {
    Claim(String),
    /// Clears the live offer only while it still points at this request.
    Release(String),
}

/// Precondition checked atomically with the provider write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProviderGuard {
    /// `status == available` and the live offer is empty or already this request.
    AvailableFor(String),
}

/// Field changes applied to a provider document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderUpdate {
    pub status: Option<ProviderStatus>,
    /// Union into `pendingRequests`; the offer log never shrinks.
    pub append_pending_request: Option<String>,
    pub active_offer: Option<OfferChange>,
    pub guard: Option<ProviderGuard>,
}

impl ProviderUpdate {
    pub fn claim_offer(request_id: impl Into<String>) -> Self {
        let request_id = request_id.into();
        Self {
            status: None,
            append_pending_request: Some(request_id.clone()),
            active_offer: Some(OfferChange::Claim(request_id.clone())),
            guard: Some(ProviderGuard::AvailableFor(request_id)),
        }
    }

    pub fn accept(request_id: impl Into<String>) -> Self {
        Self {
            status: Some(ProviderStatus::Assigned),
            append_pending_request: None,
            active_offer: Some(OfferChange::Release(request_id.into())),
            guard: None,
        }
    }

    pub fn release(request_id: impl Into<String>) -> Self {
        Self {
            active_offer: Some(OfferChange::Release(request_id.into())),
            ..Self::default()
        }
    }
}

/// Provider write left outstanding after the request write succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingProviderWrite {
    pub kind: ServiceKind,
    pub request_id: String,
    pub provider_id: String,
    pub update: ProviderUpdate,
    /// Restores the request to what it was before the first write.
    pub rollback: RequestUpdate,
}
