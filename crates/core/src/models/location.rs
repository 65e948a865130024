use serde::{Deserialize, Serialize};

/// Canonical latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Location field as found in stored documents.
///
/// Three shapes have been written over time. Variants are tried in
/// declaration order, so a map carrying both `lat`/`lon` and
/// `latitude`/`longitude` resolves as a geo point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    GeoPoint { lat: f64, lon: f64 },
    LatLonMap { latitude: f64, longitude: f64 },
    Pair(Vec<f64>),
}

impl Location {
    /// Resolves a raw document value into a coordinate.
    ///
    /// Returns `None` for missing, malformed or non-finite locations.
    pub fn resolve(value: &serde_json::Value) -> Option<Coordinate> {
        if value.is_null() {
            return None;
        }
        serde_json::from_value::<Location>(value.clone())
            .ok()
            .and_then(|location| location.coordinate())
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        let coordinate = match self {
            Location::GeoPoint { lat, lon } => Coordinate::new(*lat, *lon),
            Location::LatLonMap {
                latitude,
                longitude,
            } => Coordinate::new(*latitude, *longitude),
            Location::Pair(values) if values.len() >= 2 => Coordinate::new(values[0], values[1]),
            Location::Pair(_) => return None,
        };
        coordinate.is_finite().then_some(coordinate)
    }
}

impl From<Coordinate> for Location {
    fn from(coordinate: Coordinate) -> Self {
        Location::Pair(vec![coordinate.latitude, coordinate.longitude])
    }
}
