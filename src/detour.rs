//! Synthetic detour waypoints around a route's midpoint.
//!
//! The offsets are fixed in degrees, so the ground distance of the east and
//! west waypoints shrinks with latitude. The waypoints ignore the road
//! network; the routing provider decides whether a drivable path through each
//! one exists.

use crate::{GeoPoint, RouteGeometry};

/// Direction of a detour waypoint from the route midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardinalDirection {
    North,
    South,
    East,
    West,
}

impl CardinalDirection {
    /// Generation order of detour waypoints.
    pub const ALL: [CardinalDirection; 4] = [
        CardinalDirection::North,
        CardinalDirection::South,
        CardinalDirection::East,
        CardinalDirection::West,
    ];

    /// Unit `(d_lat, d_lon)` step for this direction.
    fn unit(&self) -> (f64, f64) {
        match self {
            CardinalDirection::North => (1.0, 0.0),
            CardinalDirection::South => (-1.0, 0.0),
            CardinalDirection::East => (0.0, 1.0),
            CardinalDirection::West => (0.0, -1.0),
        }
    }
}

/// Derives four via-points offset from the midpoint of a route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetourWaypointGenerator {
    offset_degrees: f64,
}

impl Default for DetourWaypointGenerator {
    fn default() -> Self {
        Self::new(0.025)
    }
}

impl DetourWaypointGenerator {
    pub fn new(offset_degrees: f64) -> Self {
        Self { offset_degrees }
    }

    pub fn offset_degrees(&self) -> f64 {
        self.offset_degrees
    }

    /// Waypoints north, south, east and west of the point at index
    /// `floor(N / 2)`, in that order.
    ///
    /// # Example
    /// ```
    /// use route_safety::{DetourWaypointGenerator, GeoPoint, RouteGeometry};
    ///
    /// let geometry = RouteGeometry::new(vec![
    ///     GeoPoint::new(13.08, 80.27),
    ///     GeoPoint::new(13.05, 80.21),
    /// ]).unwrap();
    /// let vias = DetourWaypointGenerator::new(0.025).generate(&geometry);
    /// assert!((vias[0].lat - 13.075).abs() < 1e-9);
    /// ```
    pub fn generate(&self, geometry: &RouteGeometry) -> [GeoPoint; 4] {
        let mid = geometry.midpoint();
        CardinalDirection::ALL.map(|direction| {
            let (d_lat, d_lon) = direction.unit();
            mid.offset(d_lat * self.offset_degrees, d_lon * self.offset_degrees)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_four_cardinal_waypoints() {
        let geometry = RouteGeometry::new(vec![
            GeoPoint::new(13.08, 80.27),
            GeoPoint::new(13.07, 80.25),
            GeoPoint::new(13.06, 80.23),
            GeoPoint::new(13.05, 80.21),
        ])
        .unwrap();
        let mid = geometry.midpoint();
        assert_eq!(mid, GeoPoint::new(13.06, 80.23));

        let [north, south, east, west] = DetourWaypointGenerator::default().generate(&geometry);

        assert!(approx_eq(north.lat, mid.lat + 0.025) && approx_eq(north.lon, mid.lon));
        assert!(approx_eq(south.lat, mid.lat - 0.025) && approx_eq(south.lon, mid.lon));
        assert!(approx_eq(east.lat, mid.lat) && approx_eq(east.lon, mid.lon + 0.025));
        assert!(approx_eq(west.lat, mid.lat) && approx_eq(west.lon, mid.lon - 0.025));
    }

    #[test]
    fn test_custom_offset() {
        let geometry = RouteGeometry::new(vec![
            GeoPoint::new(51.50, -0.12),
            GeoPoint::new(51.51, -0.13),
            GeoPoint::new(51.52, -0.14),
        ])
        .unwrap();
        let vias = DetourWaypointGenerator::new(0.1).generate(&geometry);
        let mid = GeoPoint::new(51.51, -0.13);

        for (via, direction) in vias.iter().zip(CardinalDirection::ALL) {
            let (d_lat, d_lon) = direction.unit();
            assert!(approx_eq(via.lat - mid.lat, d_lat * 0.1));
            assert!(approx_eq(via.lon - mid.lon, d_lon * 0.1));
        }
    }
}
