//! # Route Safety
//!
//! Safety-classified route overlays with alternate route synthesis.
//!
//! This library provides:
//! - Flattening of provider route responses into route geometries
//! - Per-segment safety classification through an external point predictor
//! - Alternate route synthesis from provider alternatives and cardinal detours
//! - A single-session orchestrator producing render frames for a map surface
//!
//! ## Features
//!
//! - **`http`** - Enable HTTP clients for the maps and safety prediction services
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use route_safety::{GeoPoint, RouteGeometry, geo_utils};
//!
//! let geometry = RouteGeometry::new(vec![
//!     GeoPoint::new(13.0827, 80.2707),
//!     GeoPoint::new(13.0700, 80.2500),
//!     GeoPoint::new(13.0500, 80.2100),
//! ]).unwrap();
//!
//! assert_eq!(geometry.midpoint(), GeoPoint::new(13.0700, 80.2500));
//! println!("Route length: {:.0}m", geo_utils::polyline_length(geometry.points()));
//! ```

pub mod error;
pub use error::{OverlayError, Result};

pub mod geo_utils;

pub mod services;
pub use services::{Geocoder, Prediction, ProviderPoint, ProviderRoute, RouteLeg, RoutingService, SafetyPredictor};

pub mod extract;
pub use extract::extract_geometry;

pub mod classifier;
pub use classifier::SafetyClassifier;

pub mod segmenter;
pub use segmenter::RouteSegmenter;

pub mod detour;
pub use detour::{CardinalDirection, DetourWaypointGenerator};

pub mod composer;
pub use composer::{AlternateRouteComposer, CandidateOrigin, RouteCandidate};

pub mod session;
pub use session::{Marker, RenderFrame, RouteOverlaySession, SessionPhase, Theme};

// HTTP clients for the maps and prediction services
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{AzureMapsClient, PredictionClient, ServiceConfig};

#[cfg(test)]
mod test_support;

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate with latitude and longitude in degrees.
///
/// Map surfaces usually expect `[lon, lat]` while routing query strings expect
/// `lat,lon`; use [`GeoPoint::to_lon_lat`] and [`GeoPoint::to_query`] at those
/// boundaries instead of reordering by hand.
///
/// # Example
/// ```
/// use route_safety::GeoPoint;
/// let point = GeoPoint::new(13.0827, 80.2707); // Chennai
/// assert_eq!(point.to_lon_lat(), [80.2707, 13.0827]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lon >= -180.0
            && self.lon <= 180.0
    }

    /// Position in `[lon, lat]` order, as map surfaces expect.
    pub fn to_lon_lat(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    /// `lat,lon` string used in directions queries.
    pub fn to_query(&self) -> String {
        format!("{},{}", self.lat, self.lon)
    }

    /// Shift this point by fixed degree offsets.
    pub fn offset(&self, d_lat: f64, d_lon: f64) -> Self {
        Self::new(self.lat + d_lat, self.lon + d_lon)
    }
}

/// An ordered polyline of at least two points for one route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGeometry {
    points: Vec<GeoPoint>,
}

impl RouteGeometry {
    /// Create a geometry, rejecting polylines with fewer than two points.
    pub fn new(points: Vec<GeoPoint>) -> Result<Self> {
        if points.len() < 2 {
            return Err(OverlayError::MalformedRoute(format!(
                "route geometry needs at least 2 points, got {}",
                points.len()
            )));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: a geometry holds at least two points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start(&self) -> GeoPoint {
        self.points[0]
    }

    pub fn end(&self) -> GeoPoint {
        self.points[self.points.len() - 1]
    }

    /// Index `floor(N / 2)`, shared by camera centering and detour generation.
    pub fn midpoint_index(&self) -> usize {
        self.points.len() / 2
    }

    /// The point at [`RouteGeometry::midpoint_index`]. Not interpolated.
    pub fn midpoint(&self) -> GeoPoint {
        self.points[self.midpoint_index()]
    }

    /// Total haversine length in meters.
    pub fn length_meters(&self) -> f64 {
        geo_utils::polyline_length(&self.points)
    }
}

/// Safety level reported by the point predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SafetyLevel {
    #[default]
    Safe,
    Moderate,
    Unsafe,
}

impl SafetyLevel {
    /// Parse a predictor label. Anything unrecognized is treated as `Safe`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.eq_ignore_ascii_case("unsafe") {
            SafetyLevel::Unsafe
        } else if label.eq_ignore_ascii_case("moderate") {
            SafetyLevel::Moderate
        } else {
            SafetyLevel::Safe
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyLevel::Safe => "Safe",
            SafetyLevel::Moderate => "Moderate",
            SafetyLevel::Unsafe => "Unsafe",
        }
    }
}

impl std::fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Safety classification of one point: level plus nearby incident count.
///
/// The default (`Safe`, 0 incidents) is what disabled or failed
/// classification produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SafetyLabel {
    pub level: SafetyLevel,
    pub incident_count: u32,
}

impl SafetyLabel {
    pub fn new(level: SafetyLevel, incident_count: u32) -> Self {
        Self { level, incident_count }
    }
}

/// Which route a segment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    Original,
    Alternate,
}

impl RouteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKind::Original => "original",
            RouteKind::Alternate => "alternate",
        }
    }
}

/// An RGB color, rendered as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub fn to_hex(&self) -> String {
        format!("#{:06X}", self.0 & 0x00FF_FFFF)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.to_hex())
    }
}

/// One renderable piece of a route between two consecutive points.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub kind: RouteKind,
    /// Classification of `start`, the point that owns this segment's label
    pub label: SafetyLabel,
    pub color: Color,
}

// ============================================================================
// Configuration
// ============================================================================

/// Colors used for segment rendering.
///
/// `original` and `alternate` apply when classification is disabled; the
/// three safety colors apply when it is enabled. The two schemes never mix.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    /// Default: #1565C0
    pub original: Color,
    /// Default: #6A1B9A
    pub alternate: Color,
    /// Default: #2ECC71
    pub safe: Color,
    /// Default: #F1C40F
    pub moderate: Color,
    /// Default: #E74C3C
    pub unsafe_: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            original: Color(0x1565C0),
            alternate: Color(0x6A1B9A),
            safe: Color(0x2ECC71),
            moderate: Color(0xF1C40F),
            unsafe_: Color(0xE74C3C),
        }
    }
}

impl Palette {
    /// Total mapping from safety level to color.
    pub fn for_level(&self, level: SafetyLevel) -> Color {
        match level {
            SafetyLevel::Unsafe => self.unsafe_,
            SafetyLevel::Moderate => self.moderate,
            SafetyLevel::Safe => self.safe,
        }
    }

    /// Fixed scheme color for a route kind, used when classification is off.
    pub fn for_kind(&self, kind: RouteKind) -> Color {
        match kind {
            RouteKind::Original => self.original,
            RouteKind::Alternate => self.alternate,
        }
    }
}

/// Configuration for the route overlay.
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// Offset of each synthetic detour waypoint from the route midpoint, in degrees.
    /// Fixed in degrees regardless of latitude. Default: 0.025
    pub detour_offset_degrees: f64,

    /// Alternatives requested from the routing provider beyond the primary.
    /// Default: 2
    pub max_alternatives: u32,

    /// Segment colors.
    pub palette: Palette,

    /// Whether safety classification starts enabled. Default: false
    pub classification_enabled: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            detour_offset_degrees: 0.025,
            max_alternatives: 2,
            palette: Palette::default(),
            classification_enabled: false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(13.0827, 80.2707),
            GeoPoint::new(13.0750, 80.2600),
            GeoPoint::new(13.0650, 80.2400),
            GeoPoint::new(13.0500, 80.2100),
        ]
    }

    #[test]
    fn test_geo_point_validation() {
        assert!(GeoPoint::new(13.08, 80.27).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, 181.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_boundary_orderings() {
        let p = GeoPoint::new(13.08, 80.27);
        assert_eq!(p.to_lon_lat(), [80.27, 13.08]);
        assert_eq!(p.to_query(), "13.08,80.27");
    }

    #[test]
    fn test_geometry_rejects_short_polylines() {
        assert!(matches!(
            RouteGeometry::new(vec![]),
            Err(OverlayError::MalformedRoute(_))
        ));
        assert!(matches!(
            RouteGeometry::new(vec![GeoPoint::new(13.08, 80.27)]),
            Err(OverlayError::MalformedRoute(_))
        ));
    }

    #[test]
    fn test_geometry_midpoint_uses_floor_index() {
        let geometry = RouteGeometry::new(sample_points()).unwrap();
        assert_eq!(geometry.midpoint_index(), 2);
        assert_eq!(geometry.midpoint(), GeoPoint::new(13.0650, 80.2400));

        let two = RouteGeometry::new(sample_points()[..2].to_vec()).unwrap();
        assert_eq!(two.midpoint_index(), 1);
        assert_eq!(two.midpoint(), two.end());
    }

    #[test]
    fn test_geometry_length() {
        let geometry = RouteGeometry::new(sample_points()).unwrap();
        let length = geometry.length_meters();
        // Roughly 8km across Chennai
        assert!(length > 5_000.0 && length < 12_000.0, "length was {}", length);
    }

    #[test]
    fn test_safety_level_parsing() {
        assert_eq!(SafetyLevel::from_label("Unsafe"), SafetyLevel::Unsafe);
        assert_eq!(SafetyLevel::from_label("moderate"), SafetyLevel::Moderate);
        assert_eq!(SafetyLevel::from_label("Safe"), SafetyLevel::Safe);
        assert_eq!(SafetyLevel::from_label("Dangerous?"), SafetyLevel::Safe);
        assert_eq!(SafetyLevel::from_label(""), SafetyLevel::Safe);
    }

    #[test]
    fn test_default_label_is_safe_with_no_incidents() {
        let label = SafetyLabel::default();
        assert_eq!(label.level, SafetyLevel::Safe);
        assert_eq!(label.incident_count, 0);
    }

    #[test]
    fn test_palette_mappings() {
        let palette = Palette::default();
        assert_eq!(palette.for_level(SafetyLevel::Unsafe).to_hex(), "#E74C3C");
        assert_eq!(palette.for_level(SafetyLevel::Moderate).to_hex(), "#F1C40F");
        assert_eq!(palette.for_level(SafetyLevel::Safe).to_hex(), "#2ECC71");
        assert_eq!(palette.for_kind(RouteKind::Original).to_hex(), "#1565C0");
        assert_eq!(palette.for_kind(RouteKind::Alternate).to_hex(), "#6A1B9A");
    }
}
