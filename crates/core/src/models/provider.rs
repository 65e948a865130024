use serde::{Deserialize, Serialize};

use super::{Coordinate, Location, ServiceKind};

/// Provider status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderStatus {
    Available,
    Assigned,
}

impl ProviderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderStatus::Available => "available",
            ProviderStatus::Assigned => "assigned",
        }
    }
}

impl std::fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw provider document as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderDocument {
    pub id: String,
    pub data: serde_json::Value,
}

impl ProviderDocument {
    pub fn new(id: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Whether `pendingRequests` already records `request_id`.
    pub fn offer_log_contains(&self, request_id: &str) -> bool {
        self.data
            .get("pendingRequests")
            .and_then(serde_json::Value::as_array)
            .is_some_and(|log| log.iter().any(|id| id.as_str() == Some(request_id)))
    }
}

/// Rating is stored as a decimal string, older documents hold a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RatingField {
    Text(String),
    Number(f64),
}

impl RatingField {
    pub fn value(&self) -> Option<f64> {
        let parsed = match self {
            RatingField::Text(text) => text.trim().parse::<f64>().ok()?,
            RatingField::Number(number) => *number,
        };
        parsed.is_finite().then_some(parsed)
    }
}

/// Decoded provider document fields, before location resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRecord {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub profile_pic: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub experience: Option<u32>,
    #[serde(default)]
    pub rating: Option<RatingField>,
    #[serde(default)]
    pub location: serde_json::Value,
    pub status: ProviderStatus,
    #[serde(default)]
    pub pending_requests: Vec<String>,
    #[serde(default)]
    pub completed_requests: u32,
    #[serde(default)]
    pub active_offer_id: Option<String>,
}

/// A provider admitted to candidacy, with its location resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Provider {
    pub id: String,
    pub kind: ServiceKind,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub profile_pic: Option<String>,
    pub bio: Option<String>,
    pub experience: u32,
    pub rating: Option<f64>,
    pub coordinate: Coordinate,
    pub status: ProviderStatus,
    pub pending_requests: Vec<String>,
    pub completed_requests: u32,
    pub active_offer_id: Option<String>,
}

/// Why a provider document was not admitted.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestRejection {
    Decode(String),
    Location,
}

impl std::fmt::Display for IngestRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestRejection::Decode(reason) => write!(f, "decode failed: {reason}"),
            IngestRejection::Location => f.write_str("missing or malformed location"),
        }
    }
}

impl Provider {
    /// Decodes a stored document and resolves its location once.
    pub fn from_document(
        kind: ServiceKind,
        document: &ProviderDocument,
    ) -> Result<Self, IngestRejection> {
        let record: ProviderRecord = serde_json::from_value(document.data.clone())
            .map_err(|e| IngestRejection::Decode(e.to_string()))?;
        // Caretaker scores divide experience by distance, so the field is required.
        if kind == ServiceKind::Caretaker && record.experience.is_none() {
            return Err(IngestRejection::Decode(
                "missing field `experience`".to_string(),
            ));
        }
        let coordinate = Location::resolve(&record.location).ok_or(IngestRejection::Location)?;

        Ok(Self {
            id: document.id.clone(),
            kind,
            name: record.name,
            email: record.email,
            phone_number: record.phone_number,
            profile_pic: record.profile_pic,
            bio: record.bio,
            experience: record.experience.unwrap_or(0),
            rating: record.rating.as_ref().and_then(RatingField::value),
            coordinate,
            status: record.status,
            pending_requests: record.pending_requests,
            completed_requests: record.completed_requests,
            active_offer_id: record.active_offer_id.filter(|id| !id.is_empty()),
        })
    }

    /// Available and not holding a live offer.
    pub fn is_open_for_offers(&self) -> bool {
        self.status == ProviderStatus::Available && self.active_offer_id.is_none()
    }

    pub fn has_been_offered(&self, request_id: &str) -> bool {
        self.pending_requests.iter().any(|id| id == request_id)
    }
}
