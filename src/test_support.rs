//! Stub collaborators for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::{
    GeoPoint, Geocoder, OverlayError, Prediction, ProviderRoute, Result, RoutingService,
    SafetyPredictor,
};

fn same_point(a: &GeoPoint, b: &GeoPoint) -> bool {
    (a.lat - b.lat).abs() < 1e-9 && (a.lon - b.lon).abs() < 1e-9
}

pub fn route_through(coords: &[(f64, f64)]) -> ProviderRoute {
    let points: Vec<GeoPoint> = coords.iter().map(|&(lat, lon)| GeoPoint::new(lat, lon)).collect();
    ProviderRoute::from_points(&points)
}

/// Predictor answering from a per-point table; unknown points get an empty
/// prediction.
#[derive(Default)]
pub struct StubPredictor {
    answers: Vec<(GeoPoint, Result<Prediction>)>,
    pub calls: Mutex<Vec<GeoPoint>>,
}

impl StubPredictor {
    pub fn with(mut self, point: GeoPoint, answer: Result<Prediction>) -> Self {
        self.answers.push((point, answer));
        self
    }

    pub fn label(self, point: GeoPoint, label: &str, incidents: u32) -> Self {
        self.with(
            point,
            Ok(Prediction { label: Some(label.to_string()), incident_count: Some(incidents) }),
        )
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SafetyPredictor for StubPredictor {
    async fn predict(&self, point: GeoPoint) -> Result<Prediction> {
        self.calls.lock().unwrap().push(point);
        self.answers
            .iter()
            .find(|(p, _)| same_point(p, &point))
            .map(|(_, answer)| answer.clone())
            .unwrap_or_else(|| Ok(Prediction::default()))
    }
}

/// Router returning canned routes. `primary` answers requests without
/// alternatives, `with_alternatives` answers the others. Via routes are looked
/// up by waypoint and may be delayed to scramble completion order.
#[derive(Default)]
pub struct StubRouter {
    pub primary: Vec<ProviderRoute>,
    pub with_alternatives: Vec<ProviderRoute>,
    pub fail_routes: bool,
    pub fail_vias: bool,
    vias: Vec<(GeoPoint, ProviderRoute, Duration)>,
    pub route_calls: AtomicUsize,
    pub via_calls: AtomicUsize,
}

impl StubRouter {
    pub fn new(primary: Vec<ProviderRoute>, with_alternatives: Vec<ProviderRoute>) -> Self {
        Self { primary, with_alternatives, ..Default::default() }
    }

    pub fn via(mut self, waypoint: GeoPoint, route: ProviderRoute, delay: Duration) -> Self {
        self.vias.push((waypoint, route, delay));
        self
    }

    pub fn total_calls(&self) -> usize {
        self.route_calls.load(Ordering::SeqCst) + self.via_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoutingService for StubRouter {
    async fn route(
        &self,
        _source: GeoPoint,
        _destination: GeoPoint,
        max_alternatives: u32,
    ) -> Result<Vec<ProviderRoute>> {
        self.route_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_routes {
            return Err(OverlayError::ExternalServiceUnavailable("stub router down".to_string()));
        }
        if max_alternatives == 0 {
            Ok(self.primary.clone())
        } else {
            Ok(self.with_alternatives.clone())
        }
    }

    async fn route_via(
        &self,
        _source: GeoPoint,
        via: GeoPoint,
        _destination: GeoPoint,
    ) -> Result<Option<ProviderRoute>> {
        self.via_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_vias {
            return Err(OverlayError::ExternalServiceUnavailable("stub via down".to_string()));
        }
        match self.vias.iter().find(|(p, _, _)| same_point(p, &via)) {
            Some((_, route, delay)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(*delay).await;
                }
                Ok(Some(route.clone()))
            }
            None => Ok(None),
        }
    }
}

#[derive(Default)]
pub struct StubGeocoder {
    places: HashMap<String, GeoPoint>,
    pub calls: AtomicUsize,
}

impl StubGeocoder {
    pub fn place(mut self, name: &str, point: GeoPoint) -> Self {
        self.places.insert(name.to_string(), point);
        self
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn resolve(&self, place: &str) -> Result<Option<GeoPoint>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.places.get(place).copied())
    }
}
