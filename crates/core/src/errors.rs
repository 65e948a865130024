use thiserror::Error;

use crate::models::{PendingProviderWrite, RequestStatus, ServiceKind};

/// Failure of a single store operation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("conditional update rejected for {collection}/{id}: {reason}")]
    Conflict {
        collection: String,
        id: String,
        reason: String,
    },

    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("document encoding error: {0}")]
    Serialization(String),
}

impl StoreError {
    pub fn unavailable<S: Into<String>>(msg: S) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Assignment engine error taxonomy
#[derive(Debug, Clone, Error)]
pub enum AssignmentError {
    #[error("no candidate {kind} available for request {request_id}")]
    NoCandidates {
        kind: ServiceKind,
        request_id: String,
    },

    #[error("request {request_id} is {status}, operation by provider {provider_id} not allowed")]
    InvalidState {
        request_id: String,
        provider_id: String,
        status: RequestStatus,
    },

    #[error("ranked list exhausted for request {request_id}")]
    NoMoreCandidates { request_id: String },

    /// Finish with `AssignmentEngine::resume`, or undo with `roll_back`. An
    /// interrupted offer is also completed by calling `auto_assign` again.
    #[error("request {request_id} written but provider {provider_id} update failed: {source}")]
    PartialFailure {
        request_id: String,
        provider_id: String,
        source: StoreError,
        pending: Box<PendingProviderWrite>,
    },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("pet name '{pet_name}' matches {matches} owners")]
    LookupAmbiguous { pet_name: String, matches: usize },

    #[error("no owner found for pet name '{pet_name}'")]
    LookupMissing { pet_name: String },

    #[error("user {user_id} does not own pet '{pet_name}'")]
    OwnerMismatch { user_id: String, pet_name: String },

    #[error("no origin coordinate for request {request_id}")]
    OriginUnavailable { request_id: String },

    #[error("request not found: {kind}/{request_id}")]
    RequestNotFound {
        kind: ServiceKind,
        request_id: String,
    },

    #[error("provider not found: {kind}/{provider_id}")]
    ProviderNotFound {
        kind: ServiceKind,
        provider_id: String,
    },

    #[error("every candidate for request {request_id} was claimed concurrently")]
    Contended { request_id: String },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type AssignmentResult<T> = std::result::Result<T, AssignmentError>;

impl AssignmentError {
    pub fn invalid_state(
        request_id: impl Into<String>,
        provider_id: impl Into<String>,
        status: RequestStatus,
    ) -> Self {
        Self::InvalidState {
            request_id: request_id.into(),
            provider_id: provider_id.into(),
            status,
        }
    }

    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            AssignmentError::Store(StoreError::Unavailable(_)) => true,
            AssignmentError::PartialFailure { .. } | AssignmentError::Contended { .. } => true,
            _ => false,
        }
    }

    /// Message suitable for the requesting user.
    pub fn user_message(&self) -> &'static str {
        match self {
            AssignmentError::NoCandidates { .. } | AssignmentError::NoMoreCandidates { .. } => {
                "No provider available"
            }
            AssignmentError::LookupMissing { .. } => "Pet not found",
            AssignmentError::LookupAmbiguous { .. } => "More than one pet matches this name",
            AssignmentError::OwnerMismatch { .. } => "Current user is not the owner of the pet",
            AssignmentError::OriginUnavailable { .. } => "User location not found",
            AssignmentError::Validation(_) => "Please check the request details",
            _ if self.is_retryable() => "Please retry",
            _ => "Something went wrong",
        }
    }
}

impl From<serde_json::Error> for AssignmentError {
    fn from(err: serde_json::Error) -> Self {
        AssignmentError::Serialization(err.to_string())
    }
}
