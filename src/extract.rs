//! Flattening of provider routes into [`RouteGeometry`].

use crate::{GeoPoint, OverlayError, ProviderRoute, Result, RouteGeometry};

/// Concatenate the points of every leg, in leg order, into one geometry.
///
/// Fails with [`OverlayError::MalformedRoute`] when the route has no legs,
/// when any leg has no points, or when fewer than two points result.
///
/// # Example
/// ```
/// use route_safety::{extract_geometry, GeoPoint, ProviderRoute};
///
/// let route = ProviderRoute::from_points(&[
///     GeoPoint::new(13.08, 80.27),
///     GeoPoint::new(13.05, 80.21),
/// ]);
/// let geometry = extract_geometry(&route).unwrap();
/// assert_eq!(geometry.len(), 2);
/// ```
pub fn extract_geometry(route: &ProviderRoute) -> Result<RouteGeometry> {
    if route.legs.is_empty() {
        return Err(OverlayError::MalformedRoute("route has no legs".to_string()));
    }

    let mut points = Vec::with_capacity(route.legs.iter().map(|l| l.points.len()).sum());
    for (i, leg) in route.legs.iter().enumerate() {
        if leg.points.is_empty() {
            return Err(OverlayError::MalformedRoute(format!("leg {} has no points", i)));
        }
        points.extend(leg.points.iter().copied().map(GeoPoint::from));
    }

    RouteGeometry::new(points)
}
