//! Store contracts consumed by the assignment engine.
//!
//! The backing store is a document database partitioned by kind
//! (`caretakers`/`dogwalkers`, `scheduleRequests`/`dogWalkerRequests`).
//! Every call is independent: nothing here spans two documents, so the
//! engine never assumes a request write and a provider write land together.

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::models::{
    Coordinate, ProviderDocument, ProviderUpdate, RequestStatus, RequestUpdate, ServiceKind,
    ServiceRequest,
};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Provider collection access
#[async_trait]
pub trait ProviderStore: Send + Sync {
    /// Documents with `status == available` for the kind.
    ///
    /// Documents are returned raw; decoding and location resolution happen
    /// at ingestion so a single bad record cannot fail the query.
    async fn query_available_providers(
        &self,
        kind: ServiceKind,
    ) -> StoreResult<Vec<ProviderDocument>>;

    async fn get_provider(
        &self,
        kind: ServiceKind,
        provider_id: &str,
    ) -> StoreResult<Option<ProviderDocument>>;

    /// Applies `update`; when `update.guard` is set and does not hold, returns
    /// [`StoreError::Conflict`] without touching the document.
    async fn update_provider(
        &self,
        kind: ServiceKind,
        provider_id: &str,
        update: &ProviderUpdate,
    ) -> StoreResult<()>;
}

/// Request collection access
#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn create_request(&self, request: &ServiceRequest) -> StoreResult<()>;

    async fn get_request(
        &self,
        kind: ServiceKind,
        request_id: &str,
    ) -> StoreResult<Option<ServiceRequest>>;

    async fn update_request(
        &self,
        kind: ServiceKind,
        request_id: &str,
        update: &RequestUpdate,
    ) -> StoreResult<()>;

    async fn list_requests_for_provider(
        &self,
        kind: ServiceKind,
        provider_id: &str,
        status: RequestStatus,
    ) -> StoreResult<Vec<ServiceRequest>>;

    async fn list_requests_for_user(
        &self,
        kind: ServiceKind,
        user_id: &str,
    ) -> StoreResult<Vec<ServiceRequest>>;
}

/// User profiles and pets
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Profile location of the user, resolved from any stored shape.
    async fn get_user_location(&self, user_id: &str) -> StoreResult<Option<Coordinate>>;

    /// Owner IDs of every pet whose name equals `pet_name`.
    async fn find_pet_owners(&self, pet_name: &str) -> StoreResult<Vec<String>>;
}

/// Everything the engine needs from persistence.
pub trait AssignmentStore: ProviderStore + RequestStore + UserDirectory {}

impl<T> AssignmentStore for T where T: ProviderStore + RequestStore + UserDirectory {}
