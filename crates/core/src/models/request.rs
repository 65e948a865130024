use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::{Coordinate, ServiceKind};
use crate::{AssignmentError, AssignmentResult};

const ANONYMOUS_USER: &str = "Anonymous User";

/// Request status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Available,
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Available => "available",
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaretakerDetails {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub pet_pickup: bool,
    pub pet_dropoff: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkDetails {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl WalkDetails {
    /// Start and end instants, with both times placed on `date`.
    pub fn window(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.date.and_time(self.start_time).and_utc(),
            self.date.and_time(self.end_time).and_utc(),
        )
    }
}

/// Kind-specific temporal fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestDetails {
    Caretaker(CaretakerDetails),
    Walk(WalkDetails),
}

/// A pet-sitting or dog-walking request document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub request_id: String,
    pub user_id: String,
    pub user_name: String,
    pub pet_name: String,
    #[serde(flatten)]
    pub details: RequestDetails,
    pub instructions: String,
    pub status: RequestStatus,
    #[serde(
        default,
        alias = "caretakerId",
        alias = "dogWalkerId",
        deserialize_with = "empty_as_none"
    )]
    pub assigned_provider_id: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub house_no: Option<String>,
    #[serde(default)]
    pub building_no: Option<String>,
    #[serde(default)]
    pub landmark: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|id| !id.is_empty()))
}

/// Address captured after the scheduling step.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressDetails {
    pub location: String,
    pub house_no: String,
    pub building_no: String,
    pub landmark: Option<String>,
    pub coordinate: Coordinate,
}

impl ServiceRequest {
    fn draft(
        user_id: String,
        user_name: String,
        pet_name: String,
        details: RequestDetails,
        instructions: String,
    ) -> Self {
        let user_name = if user_name.trim().is_empty() {
            ANONYMOUS_USER.to_string()
        } else {
            user_name
        };

        Self {
            request_id: Uuid::new_v4().to_string(),
            user_id,
            user_name,
            pet_name,
            details,
            instructions,
            status: RequestStatus::Available,
            assigned_provider_id: None,
            location: None,
            house_no: None,
            building_no: None,
            landmark: None,
            latitude: None,
            longitude: None,
            timestamp: Utc::now(),
        }
    }

    pub fn kind(&self) -> ServiceKind {
        match self.details {
            RequestDetails::Caretaker(_) => ServiceKind::Caretaker,
            RequestDetails::Walk(_) => ServiceKind::DogWalker,
        }
    }

    /// Explicit coordinate captured by the address step, if any.
    pub fn origin(&self) -> Option<Coordinate> {
        let coordinate = Coordinate::new(self.latitude?, self.longitude?);
        coordinate.is_finite().then_some(coordinate)
    }

    pub fn attach_address(&mut self, address: AddressDetails) -> AssignmentResult<()> {
        let required = [&address.location, &address.house_no, &address.building_no];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(AssignmentError::validation(
                "Please fill in all required fields.",
            ));
        }
        if !address.coordinate.is_finite() {
            return Err(AssignmentError::validation(
                "address coordinate is not finite",
            ));
        }

        self.location = Some(address.location);
        self.house_no = Some(address.house_no);
        self.building_no = Some(address.building_no);
        self.landmark = address.landmark.filter(|l| !l.trim().is_empty());
        self.latitude = Some(address.coordinate.latitude);
        self.longitude = Some(address.coordinate.longitude);
        Ok(())
    }

    /// Human readable duration, always derived from the stored window.
    pub fn duration(&self) -> String {
        match &self.details {
            RequestDetails::Caretaker(details) => {
                format_date_range(details.start_date, details.end_date)
            }
            RequestDetails::Walk(details) => {
                let (start, end) = details.window();
                format_hours_minutes(start, end)
            }
        }
    }
}

/// `"{h}h {m}m"`, truncated to whole minutes.
pub fn format_hours_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let seconds = (end - start).num_seconds();
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    format!("{hours}h {minutes}m")
}

/// Medium date, short time on both ends, e.g. `Jan 5, 2026 at 9:00 AM`.
pub fn format_date_range(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    const FORMAT: &str = "%b %-d, %Y at %-I:%M %p";
    format!("{} - {}", start.format(FORMAT), end.format(FORMAT))
}

/// Input for a new pet-sitting request.
#[derive(Debug, Clone)]
pub struct CaretakerRequest {
    pub user_id: String,
    pub user_name: String,
    pub pet_name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub pet_pickup: bool,
    pub pet_dropoff: bool,
    pub instructions: String,
}

impl CaretakerRequest {
    pub fn into_request(self) -> AssignmentResult<ServiceRequest> {
        if self.pet_name.trim().is_empty() {
            return Err(AssignmentError::validation("Please select a pet"));
        }
        if self.end_date < self.start_date {
            return Err(AssignmentError::validation(
                "End date must be after start date.",
            ));
        }

        Ok(ServiceRequest::draft(
            self.user_id,
            self.user_name,
            self.pet_name,
            RequestDetails::Caretaker(CaretakerDetails {
                start_date: self.start_date,
                end_date: self.end_date,
                pet_pickup: self.pet_pickup,
                pet_dropoff: self.pet_dropoff,
            }),
            self.instructions,
        ))
    }
}

/// Input for a new dog-walking request.
#[derive(Debug, Clone)]
pub struct WalkRequest {
    pub user_id: String,
    pub user_name: String,
    pub pet_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub instructions: String,
}

impl WalkRequest {
    pub fn into_request(self) -> AssignmentResult<ServiceRequest> {
        if self.pet_name.trim().is_empty() {
            return Err(AssignmentError::validation("Please select a pet"));
        }
        let details = WalkDetails {
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
        };
        let (start, end) = details.window();
        if end < start {
            return Err(AssignmentError::validation(
                "End time must be after start time.",
            ));
        }

        Ok(ServiceRequest::draft(
            self.user_id,
            self.user_name,
            self.pet_name,
            RequestDetails::Walk(details),
            self.instructions,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn walk(start: (u32, u32), end: (u32, u32)) -> WalkRequest {
        WalkRequest {
            user_id: "u1".into(),
            user_name: "Priya".into(),
            pet_name: "Bruno".into(),
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            instructions: String::new(),
        }
    }

    #[test]
    fn test_walk_duration() {
        let request = walk((9, 0), (11, 30)).into_request().unwrap();
        assert_eq!(request.duration(), "2h 30m");
        assert_eq!(request.kind(), ServiceKind::DogWalker);
        assert_eq!(request.status, RequestStatus::Available);
        assert!(request.assigned_provider_id.is_none());
    }

    #[test]
    fn test_walk_end_before_start_rejected() {
        let err = walk((11, 0), (9, 0)).into_request().unwrap_err();
        assert!(matches!(err, AssignmentError::Validation(_)));
    }

    #[test]
    fn test_caretaker_duration_format() {
        let request = CaretakerRequest {
            user_id: "u1".into(),
            user_name: String::new(),
            pet_name: "Bruno".into(),
            start_date: Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2026, 1, 7, 18, 0, 0).unwrap(),
            pet_pickup: true,
            pet_dropoff: false,
            instructions: "Feed twice".into(),
        }
        .into_request()
        .unwrap();

        assert_eq!(
            request.duration(),
            "Jan 5, 2026 at 9:00 AM - Jan 7, 2026 at 6:00 PM"
        );
        assert_eq!(request.user_name, "Anonymous User");
        assert_eq!(request.kind(), ServiceKind::Caretaker);
    }

    #[test]
    fn test_attach_address_requires_fields() {
        let mut request = walk((9, 0), (10, 0)).into_request().unwrap();
        let mut address = AddressDetails {
            location: "Anna Nagar, Chennai".into(),
            house_no: "".into(),
            building_no: "B2".into(),
            landmark: None,
            coordinate: Coordinate::new(13.08, 80.21),
        };
        assert!(request.attach_address(address.clone()).is_err());
        assert!(request.origin().is_none());

        address.house_no = "12".into();
        request.attach_address(address).unwrap();
        assert_eq!(request.origin(), Some(Coordinate::new(13.08, 80.21)));
    }

    #[test]
    fn test_document_shape() {
        let request = walk((7, 15), (8, 0)).into_request().unwrap();
        let doc = serde_json::to_value(&request).unwrap();
        assert_eq!(doc["status"], json!("available"));
        assert_eq!(doc["startTime"], json!("07:15:00"));
        assert!(doc.get("assignedProviderId").is_some());

        let decoded: ServiceRequest = serde_json::from_value(doc).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_legacy_empty_provider_id() {
        let doc = json!({
            "requestId": "r1",
            "userId": "u1",
            "userName": "Priya",
            "petName": "Bruno",
            "date": "2026-03-14",
            "startTime": "09:00:00",
            "endTime": "10:00:00",
            "instructions": "",
            "status": "available",
            "dogWalkerId": "",
            "timestamp": "2026-03-01T10:00:00Z"
        });
        let request: ServiceRequest = serde_json::from_value(doc).unwrap();
        assert!(request.assigned_provider_id.is_none());
        assert_eq!(request.kind(), ServiceKind::DogWalker);
    }
}
