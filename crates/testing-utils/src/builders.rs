//! Test data builders for provider documents and requests
//!
//! Builders start from a valid document and let tests override only what
//! the scenario cares about.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde_json::{json, Value};
use snuffy_core::{AddressDetails, CaretakerRequest, Coordinate, ServiceRequest, WalkRequest};

/// Builder for raw provider documents as the store would hold them
pub struct ProviderDocBuilder {
    data: Value,
}

impl ProviderDocBuilder {
    pub fn new() -> Self {
        Self {
            data: json!({
                "name": "Test Provider",
                "email": "provider@example.com",
                "phoneNumber": "555-0100",
                "profilePic": "",
                "bio": "",
                "experience": 1,
                "rating": "4.0",
                "location": [0.0, 0.0],
                "status": "available",
                "pendingRequests": [],
                "completedRequests": 0
            }),
        }
    }

    fn set(mut self, key: &str, value: Value) -> Self {
        if let Some(fields) = self.data.as_object_mut() {
            fields.insert(key.to_string(), value);
        }
        self
    }

    fn remove(mut self, key: &str) -> Self {
        if let Some(fields) = self.data.as_object_mut() {
            fields.remove(key);
        }
        self
    }

    pub fn with_name(self, name: &str) -> Self {
        self.set("name", json!(name))
    }

    pub fn with_experience(self, years: u32) -> Self {
        self.set("experience", json!(years))
    }

    pub fn without_experience(self) -> Self {
        self.remove("experience")
    }

    /// Rating stored as a decimal string.
    pub fn with_rating(self, rating: f64) -> Self {
        self.set("rating", json!(rating.to_string()))
    }

    pub fn with_raw_rating(self, rating: Value) -> Self {
        self.set("rating", rating)
    }

    pub fn without_rating(self) -> Self {
        self.remove("rating")
    }

    /// Location as a `[lat, lon]` pair.
    pub fn at(self, coordinate: Coordinate) -> Self {
        self.set(
            "location",
            json!([coordinate.latitude, coordinate.longitude]),
        )
    }

    /// Location as a native geo-point.
    pub fn at_geo_point(self, coordinate: Coordinate) -> Self {
        self.set(
            "location",
            json!({ "lat": coordinate.latitude, "lon": coordinate.longitude }),
        )
    }

    /// Location as a `{latitude, longitude}` map.
    pub fn at_lat_lon_map(self, coordinate: Coordinate) -> Self {
        self.set(
            "location",
            json!({ "latitude": coordinate.latitude, "longitude": coordinate.longitude }),
        )
    }

    pub fn with_raw_location(self, location: Value) -> Self {
        self.set("location", location)
    }

    pub fn without_location(self) -> Self {
        self.remove("location")
    }

    pub fn assigned(self) -> Self {
        self.set("status", json!("assigned"))
    }

    pub fn with_pending_requests(self, request_ids: &[&str]) -> Self {
        self.set("pendingRequests", json!(request_ids))
    }

    pub fn with_active_offer(self, request_id: &str) -> Self {
        self.set("activeOfferId", json!(request_id))
    }

    pub fn build(self) -> Value {
        self.data
    }
}

impl Default for ProviderDocBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for dog-walking requests
pub struct WalkRequestBuilder {
    input: WalkRequest,
    origin: Option<Coordinate>,
}

impl WalkRequestBuilder {
    pub fn new() -> Self {
        Self {
            input: WalkRequest {
                user_id: "owner-1".to_string(),
                user_name: "Test Owner".to_string(),
                pet_name: "Rex".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 5, 4).unwrap_or_default(),
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
                end_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap_or_default(),
                instructions: String::new(),
            },
            origin: None,
        }
    }

    pub fn with_user(mut self, user_id: &str) -> Self {
        self.input.user_id = user_id.to_string();
        self
    }

    pub fn with_pet(mut self, pet_name: &str) -> Self {
        self.input.pet_name = pet_name.to_string();
        self
    }

    pub fn with_times(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.input.start_time = start;
        self.input.end_time = end;
        self
    }

    /// Attaches an address so the request carries its own origin.
    pub fn with_origin(mut self, origin: Coordinate) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn build(self) -> ServiceRequest {
        let mut request = self
            .input
            .into_request()
            .expect("walk request builder produced an invalid request");
        if let Some(origin) = self.origin {
            attach_test_address(&mut request, origin);
        }
        request
    }
}

impl Default for WalkRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for pet-sitting requests
pub struct CaretakerRequestBuilder {
    input: CaretakerRequest,
    origin: Option<Coordinate>,
}

impl CaretakerRequestBuilder {
    pub fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2026, 5, 4, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self {
            input: CaretakerRequest {
                user_id: "owner-1".to_string(),
                user_name: "Test Owner".to_string(),
                pet_name: "Rex".to_string(),
                start_date: start,
                end_date: start + Duration::days(2),
                pet_pickup: false,
                pet_dropoff: false,
                instructions: String::new(),
            },
            origin: None,
        }
    }

    pub fn with_user(mut self, user_id: &str) -> Self {
        self.input.user_id = user_id.to_string();
        self
    }

    pub fn with_pet(mut self, pet_name: &str) -> Self {
        self.input.pet_name = pet_name.to_string();
        self
    }

    pub fn with_dates(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.input.start_date = start;
        self.input.end_date = end;
        self
    }

    pub fn with_origin(mut self, origin: Coordinate) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn build(self) -> ServiceRequest {
        let mut request = self
            .input
            .into_request()
            .expect("caretaker request builder produced an invalid request");
        if let Some(origin) = self.origin {
            attach_test_address(&mut request, origin);
        }
        request
    }
}

impl Default for CaretakerRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn attach_test_address(request: &mut ServiceRequest, origin: Coordinate) {
    request
        .attach_address(AddressDetails {
            location: "Test Street".to_string(),
            house_no: "1".to_string(),
            building_no: "A".to_string(),
            landmark: None,
            coordinate: origin,
        })
        .expect("test address is complete");
}
