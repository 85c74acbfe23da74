//! Interfaces of the external collaborators: geocoding, routing and point
//! safety prediction.
//!
//! The core only consumes these traits. The `http` feature provides
//! implementations backed by Azure Maps style endpoints and a local
//! prediction server; tests plug in stubs.

use async_trait::async_trait;

use crate::{GeoPoint, Result};

/// A point record as returned inside a provider route leg.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct ProviderPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<ProviderPoint> for GeoPoint {
    fn from(p: ProviderPoint) -> Self {
        GeoPoint::new(p.latitude, p.longitude)
    }
}

impl From<GeoPoint> for ProviderPoint {
    fn from(p: GeoPoint) -> Self {
        ProviderPoint { latitude: p.lat, longitude: p.lon }
    }
}

/// One leg of a provider route.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct RouteLeg {
    #[cfg_attr(feature = "serde", serde(default))]
    pub points: Vec<ProviderPoint>,
}

/// A route as returned by the routing provider, before flattening.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct ProviderRoute {
    #[cfg_attr(feature = "serde", serde(default))]
    pub legs: Vec<RouteLeg>,
}

impl ProviderRoute {
    /// Single-leg route through the given points.
    pub fn from_points(points: &[GeoPoint]) -> Self {
        Self {
            legs: vec![RouteLeg {
                points: points.iter().copied().map(ProviderPoint::from).collect(),
            }],
        }
    }
}

/// Raw prediction for one point. Missing fields mean "use the default".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prediction {
    pub label: Option<String>,
    pub incident_count: Option<u32>,
}

/// Place name to coordinate lookup.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a place name. `Ok(None)` means no match, which is not an error.
    async fn resolve(&self, place: &str) -> Result<Option<GeoPoint>>;
}

/// Directions provider.
#[async_trait]
pub trait RoutingService: Send + Sync {
    /// Routes from `source` to `destination`. Index 0 is the provider's
    /// primary route, followed by up to `max_alternatives` alternatives.
    async fn route(
        &self,
        source: GeoPoint,
        destination: GeoPoint,
        max_alternatives: u32,
    ) -> Result<Vec<ProviderRoute>>;

    /// A single route constrained to pass through `via`, if one exists.
    async fn route_via(
        &self,
        source: GeoPoint,
        via: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Option<ProviderRoute>>;
}

/// Point-level safety inference.
#[async_trait]
pub trait SafetyPredictor: Send + Sync {
    async fn predict(&self, point: GeoPoint) -> Result<Prediction>;
}
