//! # Geographic Utilities
//!
//! Distance helpers for route geometries.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two points |
//! | [`polyline_length`] | Total length of a polyline in meters |
//! | [`degrees_to_meters`] | Approximate ground distance of a degree offset |
//!
//! All functions expect WGS84 coordinates in degrees.

use geo::{Distance, Haversine, Point};
use crate::GeoPoint;

/// Great-circle distance between two points in meters (spherical Earth,
/// radius 6,371 km).
///
/// # Example
///
/// ```rust
/// use route_safety::{GeoPoint, geo_utils};
///
/// let london = GeoPoint::new(51.5074, -0.1278);
/// let paris = GeoPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0);
/// ```
#[inline]
pub fn haversine_distance(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let point1 = Point::new(p1.lon, p1.lat);
    let point2 = Point::new(p2.lon, p2.lat);
    Haversine::distance(point1, point2)
}

/// Sum of haversine distances between consecutive points. Empty or
/// single-point input returns 0.0.
pub fn polyline_length(points: &[GeoPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Ground distance in meters covered by shifting `origin` by the given
/// degree offsets.
///
/// Detour waypoints use fixed degree offsets, so their real distance from the
/// route shrinks in longitude as latitude grows. This makes that visible.
pub fn degrees_to_meters(origin: &GeoPoint, d_lat: f64, d_lon: f64) -> f64 {
    haversine_distance(origin, &origin.offset(d_lat, d_lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_haversine_distance_same_point() {
        let p = GeoPoint::new(13.0827, 80.2707);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_distance_known_value() {
        let london = GeoPoint::new(51.5074, -0.1278);
        let paris = GeoPoint::new(48.8566, 2.3522);
        assert!(approx_eq(haversine_distance(&london, &paris), 343_560.0, 5000.0));
    }

    #[test]
    fn test_polyline_length_degenerate() {
        assert_eq!(polyline_length(&[]), 0.0);
        assert_eq!(polyline_length(&[GeoPoint::new(13.08, 80.27)]), 0.0);
    }

    #[test]
    fn test_polyline_length_two_points() {
        let track = vec![GeoPoint::new(13.0800, 80.2700), GeoPoint::new(13.0810, 80.2700)];
        // 0.001 degrees of latitude is about 111m
        assert!(approx_eq(polyline_length(&track), 111.2, 1.0));
    }

    #[test]
    fn test_degree_offsets_shrink_with_latitude() {
        let equator = GeoPoint::new(0.0, 80.0);
        let north = GeoPoint::new(60.0, 80.0);

        let lat_equator = degrees_to_meters(&equator, 0.025, 0.0);
        let lon_equator = degrees_to_meters(&equator, 0.0, 0.025);
        let lon_north = degrees_to_meters(&north, 0.0, 0.025);

        assert!(approx_eq(lat_equator, 2_780.0, 20.0));
        assert!(approx_eq(lon_equator, lat_equator, 20.0));
        assert!(approx_eq(lon_north, lon_equator / 2.0, 20.0));
    }
}
