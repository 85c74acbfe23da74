//! Alternate route candidates from provider alternatives and detours.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use log::{debug, info, warn};

use crate::{
    extract_geometry, DetourWaypointGenerator, GeoPoint, RouteGeometry, RoutingService,
};

/// Where a candidate route came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateOrigin {
    ProviderPrimary,
    ProviderAlternative,
    Detour,
}

/// A possible alternate route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteCandidate {
    pub geometry: RouteGeometry,
    pub origin: CandidateOrigin,
}

/// Gathers alternate route candidates in priority order.
pub struct AlternateRouteComposer {
    router: Arc<dyn RoutingService>,
    detours: DetourWaypointGenerator,
    max_alternatives: u32,
}

impl AlternateRouteComposer {
    pub fn new(
        router: Arc<dyn RoutingService>,
        detours: DetourWaypointGenerator,
        max_alternatives: u32,
    ) -> Self {
        Self { router, detours, max_alternatives }
    }

    /// Candidate alternates for `source -> destination`.
    ///
    /// Provider alternatives come first (the provider's own primary at index 0
    /// is dropped), followed by one `Detour` candidate per detour waypoint that
    /// the provider could route through, in north, south, east, west order.
    /// Failed or empty provider answers are skipped; this never errors.
    pub async fn compose(
        &self,
        source: GeoPoint,
        destination: GeoPoint,
        primary: &RouteGeometry,
    ) -> Vec<RouteCandidate> {
        let start = Instant::now();
        let mut candidates = self.provider_alternatives(source, destination).await;
        let provider_count = candidates.len();

        let vias = self.detours.generate(primary);
        let detours = join_all(
            vias.iter()
                .map(|&via| self.router.route_via(source, via, destination)),
        )
        .await;

        for (via, result) in vias.iter().zip(detours) {
            let route = match result {
                Ok(Some(route)) => route,
                Ok(None) => {
                    debug!("[Composer] No route via ({:.5}, {:.5})", via.lat, via.lon);
                    continue;
                }
                Err(e) => {
                    warn!("[Composer] Detour via ({:.5}, {:.5}) failed: {}", via.lat, via.lon, e);
                    continue;
                }
            };
            match extract_geometry(&route) {
                Ok(geometry) => candidates.push(RouteCandidate { geometry, origin: CandidateOrigin::Detour }),
                Err(e) => warn!("[Composer] Skipping detour via ({:.5}, {:.5}): {}", via.lat, via.lon, e),
            }
        }

        info!(
            "[Composer] {} candidates ({} provider, {} detour) in {:?}",
            candidates.len(),
            provider_count,
            candidates.len() - provider_count,
            start.elapsed()
        );
        for (i, candidate) in candidates.iter().enumerate() {
            debug!(
                "[Composer] #{} {:?}: {} points, {:.0}m",
                i,
                candidate.origin,
                candidate.geometry.len(),
                candidate.geometry.length_meters()
            );
        }

        candidates
    }

    async fn provider_alternatives(&self, source: GeoPoint, destination: GeoPoint) -> Vec<RouteCandidate> {
        let routes = match self.router.route(source, destination, self.max_alternatives).await {
            Ok(routes) => routes,
            Err(e) => {
                warn!("[Composer] Provider alternatives unavailable: {}", e);
                return Vec::new();
            }
        };

        routes
            .iter()
            .skip(1)
            .filter_map(|route| match extract_geometry(route) {
                Ok(geometry) => Some(RouteCandidate { geometry, origin: CandidateOrigin::ProviderAlternative }),
                Err(e) => {
                    warn!("[Composer] Skipping provider alternative: {}", e);
                    None
                }
            })
            .collect()
    }
}
