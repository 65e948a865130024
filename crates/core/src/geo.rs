//! Great-circle distance between coordinates.

use crate::models::Coordinate;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Haversine distance in meters.
///
/// Latitudes are clamped to [-90, 90]. A non-finite input yields
/// `f64::INFINITY` so that callers rank the pair last instead of seeing NaN.
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    if !a.is_finite() || !b.is_finite() {
        return f64::INFINITY;
    }

    let lat1 = a.latitude.clamp(-90.0, 90.0).to_radians();
    let lat2 = b.latitude.clamp(-90.0, 90.0).to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let central_angle = 2.0 * h.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_METERS * central_angle
}

pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    distance_meters(a, b) / 1000.0
}

/// Point `meters` due north of `origin` along its meridian.
pub fn offset_north(origin: Coordinate, meters: f64) -> Coordinate {
    let delta = (meters / EARTH_RADIUS_METERS).to_degrees();
    Coordinate::new(origin.latitude + delta, origin.longitude)
}
