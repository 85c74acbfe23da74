//! The route overlay session: state machine and orchestration.
//!
//! ```text
//! Empty --primary--> HasPrimary --alternate--> HasPrimaryAndAlternate
//!                        ^                              |
//!                        +----------- primary ----------+
//! ```
//!
//! A session is driven through `&mut self`, so at most one operation runs on
//! it at a time.

use std::sync::Arc;
use std::time::Instant;

use log::info;

use crate::{
    extract_geometry, AlternateRouteComposer, CandidateOrigin, DetourWaypointGenerator, GeoPoint,
    Geocoder, OverlayConfig, OverlayError, Result, RouteCandidate, RouteGeometry, RouteKind,
    RouteSegmenter, RoutingService, SafetyClassifier, SafetyPredictor, Segment,
};

/// Map theme. Purely presentational; carried through to the render frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Day,
    Night,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Day => Theme::Night,
            Theme::Night => Theme::Day,
        }
    }
}

/// A labeled endpoint marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: GeoPoint,
    pub title: String,
}

impl Marker {
    pub fn new(position: GeoPoint, title: impl Into<String>) -> Self {
        Self { position, title: title.into() }
    }
}

/// Everything the map surface needs to draw the current routes.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    /// Primary route segments followed by alternate route segments, in order.
    pub segments: Vec<Segment>,
    /// Source then destination.
    pub markers: [Marker; 2],
    /// Point at index `floor(N / 2)` of the primary route.
    pub camera_center: GeoPoint,
    pub theme: Theme,
}

/// Observable state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Empty,
    HasPrimary,
    HasPrimaryAndAlternate,
}

#[derive(Debug, Clone)]
struct ActiveRoute {
    source: Marker,
    destination: Marker,
    primary: RouteCandidate,
    alternate: Option<RouteCandidate>,
}

/// Holds the current routes and display toggles, and turns route requests
/// into render frames.
pub struct RouteOverlaySession {
    router: Arc<dyn RoutingService>,
    geocoder: Option<Arc<dyn Geocoder>>,
    segmenter: RouteSegmenter,
    composer: AlternateRouteComposer,
    config: OverlayConfig,
    active: Option<ActiveRoute>,
    classification_enabled: bool,
    theme: Theme,
}

impl RouteOverlaySession {
    /// A session without safety prediction or geocoding.
    pub fn new(router: Arc<dyn RoutingService>, config: OverlayConfig) -> Self {
        let composer = AlternateRouteComposer::new(
            Arc::clone(&router),
            DetourWaypointGenerator::new(config.detour_offset_degrees),
            config.max_alternatives,
        );
        Self {
            geocoder: None,
            segmenter: RouteSegmenter::new(SafetyClassifier::disabled(), config.palette.clone()),
            composer,
            classification_enabled: config.classification_enabled,
            config,
            router,
            active: None,
            theme: Theme::default(),
        }
    }

    pub fn with_predictor(mut self, predictor: Arc<dyn SafetyPredictor>) -> Self {
        self.segmenter = RouteSegmenter::new(SafetyClassifier::new(predictor), self.config.palette.clone());
        self
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    // ------------------------------------------------------------------------
    // State accessors
    // ------------------------------------------------------------------------

    pub fn phase(&self) -> SessionPhase {
        match &self.active {
            None => SessionPhase::Empty,
            Some(active) if active.alternate.is_some() => SessionPhase::HasPrimaryAndAlternate,
            Some(_) => SessionPhase::HasPrimary,
        }
    }

    pub fn last_source(&self) -> Option<GeoPoint> {
        self.active.as_ref().map(|a| a.source.position)
    }

    pub fn last_destination(&self) -> Option<GeoPoint> {
        self.active.as_ref().map(|a| a.destination.position)
    }

    pub fn primary_route(&self) -> Option<&RouteGeometry> {
        self.active.as_ref().map(|a| &a.primary.geometry)
    }

    pub fn alternate_route(&self) -> Option<&RouteCandidate> {
        self.active.as_ref().and_then(|a| a.alternate.as_ref())
    }

    pub fn classification_enabled(&self) -> bool {
        self.classification_enabled
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Fetch and render the primary route between two coordinates.
    ///
    /// Replaces any previous primary route and clears the alternate. Fails
    /// with [`OverlayError::NoRouteFound`] when the provider returns no route,
    /// leaving the session untouched.
    pub async fn compute_primary_route(&mut self, source: GeoPoint, destination: GeoPoint) -> Result<RenderFrame> {
        self.replace_primary(Marker::new(source, "Source"), Marker::new(destination, "Destination"))
            .await
    }

    /// Compute and render an alternate route.
    ///
    /// Requires a primary route ([`OverlayError::PrimaryRouteMissing`]
    /// otherwise, before any external call). The first candidate wins:
    /// provider alternatives before detours, each in list order. Returns
    /// `Ok(None)` without touching the session when no candidate exists.
    pub async fn compute_alternate_route(
        &mut self,
        source: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Option<RenderFrame>> {
        let start = Instant::now();
        let candidates = {
            let active = self.active.as_ref().ok_or(OverlayError::PrimaryRouteMissing)?;
            self.composer.compose(source, destination, &active.primary.geometry).await
        };

        let Some(selected) = select_alternate(candidates) else {
            info!("[Session] No alternate route available, keeping current view");
            return Ok(None);
        };
        info!(
            "[Session] Alternate route selected: {:?}, {} points, {:.0}m",
            selected.origin,
            selected.geometry.len(),
            selected.geometry.length_meters()
        );

        let active = self.active.as_mut().ok_or(OverlayError::PrimaryRouteMissing)?;
        active.alternate = Some(selected);

        let frame = self.render().await;
        info!("[Session] Alternate route computed in {:?}", start.elapsed());
        Ok(frame)
    }

    /// Geocode both place names, then compute the primary route between them.
    ///
    /// A place with no match fails with [`OverlayError::InvalidLocation`]
    /// before any routing request.
    pub async fn plan_route(&mut self, source_name: &str, destination_name: &str) -> Result<RenderFrame> {
        let geocoder = self.geocoder.as_ref().ok_or_else(|| {
            OverlayError::ExternalServiceUnavailable("no geocoder configured".to_string())
        })?;

        // Out-of-range coordinates are treated like an unknown place
        let source = geocoder
            .resolve(source_name)
            .await?
            .filter(GeoPoint::is_valid)
            .ok_or_else(|| OverlayError::InvalidLocation(source_name.to_string()))?;
        let destination = geocoder
            .resolve(destination_name)
            .await?
            .filter(GeoPoint::is_valid)
            .ok_or_else(|| OverlayError::InvalidLocation(destination_name.to_string()))?;

        self.replace_primary(Marker::new(source, source_name), Marker::new(destination, destination_name))
            .await
    }

    /// Compute an alternate route between the last source and destination.
    pub async fn plan_alternate(&mut self) -> Result<Option<RenderFrame>> {
        let (source, destination) = self
            .active
            .as_ref()
            .map(|a| (a.source.position, a.destination.position))
            .ok_or(OverlayError::PrimaryRouteMissing)?;
        self.compute_alternate_route(source, destination).await
    }

    /// Switch safety classification on or off. Re-renders when a route exists.
    pub async fn set_classification_enabled(&mut self, enabled: bool) -> Option<RenderFrame> {
        self.classification_enabled = enabled;
        info!("[Session] Safety classification {}", if enabled { "enabled" } else { "disabled" });
        self.render().await
    }

    /// Flip between day and night themes. Re-renders when a route exists.
    pub async fn toggle_theme(&mut self) -> Option<RenderFrame> {
        self.theme = self.theme.toggled();
        self.render().await
    }

    /// Render the current routes, if any.
    pub async fn render(&self) -> Option<RenderFrame> {
        match &self.active {
            Some(active) => Some(self.render_active(active).await),
            None => None,
        }
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    async fn replace_primary(&mut self, source: Marker, destination: Marker) -> Result<RenderFrame> {
        let start = Instant::now();
        info!(
            "[Session] Primary route: ({:.5}, {:.5}) -> ({:.5}, {:.5})",
            source.position.lat, source.position.lon, destination.position.lat, destination.position.lon
        );

        let routes = self.router.route(source.position, destination.position, 0).await?;
        let route = routes.first().ok_or(OverlayError::NoRouteFound)?;
        let geometry = extract_geometry(route)?;

        let active = ActiveRoute {
            source,
            destination,
            primary: RouteCandidate { geometry, origin: CandidateOrigin::ProviderPrimary },
            alternate: None,
        };
        let frame = self.render_active(&active).await;
        self.active = Some(active);

        info!(
            "[Session] Primary route computed: {} segments in {:?}",
            frame.segments.len(),
            start.elapsed()
        );
        Ok(frame)
    }

    async fn render_active(&self, active: &ActiveRoute) -> RenderFrame {
        let primary = &active.primary.geometry;
        let mut segments = self
            .segmenter
            .segment(primary, RouteKind::Original, self.classification_enabled)
            .await;

        if let Some(alternate) = &active.alternate {
            segments.extend(
                self.segmenter
                    .segment(&alternate.geometry, RouteKind::Alternate, self.classification_enabled)
                    .await,
            );
        }

        RenderFrame {
            segments,
            markers: [active.source.clone(), active.destination.clone()],
            camera_center: primary.midpoint(),
            theme: self.theme,
        }
    }
}

/// First candidate that is not the provider's primary route.
fn select_alternate(candidates: Vec<RouteCandidate>) -> Option<RouteCandidate> {
    candidates
        .into_iter()
        .find(|c| c.origin != CandidateOrigin::ProviderPrimary)
}
