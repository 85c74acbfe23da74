//! HTTP clients for the maps provider and the safety prediction server.
//!
//! - [`AzureMapsClient`] implements [`Geocoder`] and [`RoutingService`] over
//!   the Azure Maps search and directions endpoints
//! - [`PredictionClient`] implements [`SafetyPredictor`] over a local
//!   `POST /predict_route` endpoint
//!
//! Maps requests retry 429 responses and connection failures with exponential
//! backoff. Prediction requests are sent once: the classifier runs one request
//! per route point and falls back to the default label on any failure.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{
    GeoPoint, Geocoder, OverlayError, Prediction, ProviderRoute, Result, RoutingService,
    SafetyPredictor,
};

const MAX_RETRIES: u32 = 3;
const MAPS_API_VERSION: &str = "1.0";

/// Endpoints and credentials for the external services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Maps provider base URL. Default: https://atlas.microsoft.com
    pub maps_base_url: String,
    /// Maps subscription key.
    pub subscription_key: String,
    /// Safety prediction endpoint. Default: http://127.0.0.1:5001/predict_route
    pub prediction_url: String,
    /// Default: car
    pub travel_mode: String,
    /// Default: fastest
    pub route_type: String,
    /// Per-request timeout. Default: 30s
    pub request_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            maps_base_url: "https://atlas.microsoft.com".to_string(),
            subscription_key: String::new(),
            prediction_url: "http://127.0.0.1:5001/predict_route".to_string(),
            travel_mode: "car".to_string(),
            route_type: "fastest".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ServiceConfig {
    /// Defaults overridden by `AZURE_MAPS_KEY`, `AZURE_MAPS_BASE_URL` and
    /// `SAFETY_PREDICTOR_URL` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("AZURE_MAPS_KEY") {
            config.subscription_key = key;
        }
        if let Ok(url) = std::env::var("AZURE_MAPS_BASE_URL") {
            config.maps_base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(url) = std::env::var("SAFETY_PREDICTOR_URL") {
            config.prediction_url = url;
        }
        config
    }

    fn build_client(&self) -> Result<Client> {
        Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .tcp_keepalive(Duration::from_secs(30))
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| {
                OverlayError::ExternalServiceUnavailable(format!("Failed to create HTTP client: {}", e))
            })
    }
}

// ============================================================================
// Wire formats
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    position: Option<SearchPosition>,
}

#[derive(Debug, Deserialize)]
struct SearchPosition {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<ProviderRoute>,
}

#[derive(Debug, Serialize)]
struct PredictRequest {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    res: Option<String>,
    /// Kept loose so a float or negative count does not drop the label.
    incident_count: Option<serde_json::Value>,
}

/// Non-negative integral counts, including floats such as `3.0`.
fn incident_count(value: &serde_json::Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => Some(f as u32),
        _ => None,
    }
}

impl From<PredictResponse> for Prediction {
    fn from(r: PredictResponse) -> Self {
        Prediction { label: r.res, incident_count: r.incident_count.as_ref().and_then(incident_count) }
    }
}

/// `lat,lon:lat,lon[:...]` waypoint list for directions queries.
fn directions_query(points: &[GeoPoint]) -> String {
    points.iter().map(GeoPoint::to_query).collect::<Vec<_>>().join(":")
}

// ============================================================================
// Transport
// ============================================================================

/// Send a request, retrying 429 responses and transport errors.
///
/// Any other status is returned to the caller as-is.
async fn send_with_retry<F>(what: &str, make_request: F) -> Result<Response>
where
    F: Fn() -> RequestBuilder,
{
    let mut retries = 0;
    loop {
        match make_request().send().await {
            Ok(resp) if resp.status() == StatusCode::TOO_MANY_REQUESTS => {
                retries += 1;
                if retries > MAX_RETRIES {
                    return Err(OverlayError::ExternalServiceUnavailable(
                        "Max retries exceeded (429)".to_string(),
                    ));
                }
                // Exponential backoff: 1s, 2s, 4s
                let wait = Duration::from_millis(500 * (1 << retries.min(3)));
                warn!("[{}] 429 Too Many Requests, retry {} with {:?} backoff", what, retries, wait);
                tokio::time::sleep(wait).await;
            }
            Ok(resp) => return Ok(resp),
            Err(e) => {
                retries += 1;
                if retries > MAX_RETRIES {
                    return Err(OverlayError::ExternalServiceUnavailable(format!("Request error: {}", e)));
                }
                let wait = Duration::from_millis(200 * (1 << retries));
                warn!("[{}] Error: {}, retry {} after {:?}", what, e, retries, wait);
                tokio::time::sleep(wait).await;
            }
        }
    }
}

/// Send a request exactly once. Transport errors are not retried.
async fn send_once(what: &str, request: RequestBuilder) -> Result<Response> {
    request.send().await.map_err(|e| {
        debug!("[{}] Error: {}", what, e);
        OverlayError::ExternalServiceUnavailable(format!("Request error: {}", e))
    })
}

/// Download and parse a JSON body, logging timings.
async fn read_json<T: serde::de::DeserializeOwned>(what: &str, resp: Response, started: Instant) -> Result<T> {
    let headers_elapsed = started.elapsed();
    let bytes = resp.bytes().await?;
    let json_start = Instant::now();
    let data = serde_json::from_slice(&bytes)?;
    debug!(
        "[{}] headers={:?} body={:.1}KB json={:?} total={:?}",
        what,
        headers_elapsed,
        bytes.len() as f64 / 1024.0,
        json_start.elapsed(),
        started.elapsed()
    );
    Ok(data)
}

// ============================================================================
// Maps client
// ============================================================================

/// Geocoding and directions over the Azure Maps REST API.
pub struct AzureMapsClient {
    client: Client,
    config: ServiceConfig,
}

impl AzureMapsClient {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        Ok(Self { client: config.build_client()?, config })
    }

    /// Directions request through `waypoints`. Client errors (the provider
    /// answers 400 when no route exists) yield no routes.
    async fn directions(&self, waypoints: &[GeoPoint], max_alternatives: Option<u32>) -> Result<Vec<ProviderRoute>> {
        let url = format!("{}/route/directions/json", self.config.maps_base_url);
        let query = directions_query(waypoints);
        let alternatives = max_alternatives.map(|n| n.to_string());
        let started = Instant::now();

        let resp = send_with_retry("Directions", || {
            let request = self.client.get(&url).query(&[
                ("api-version", MAPS_API_VERSION),
                ("subscription-key", self.config.subscription_key.as_str()),
                ("query", query.as_str()),
                ("travelMode", self.config.travel_mode.as_str()),
                ("routeType", self.config.route_type.as_str()),
            ]);
            match &alternatives {
                Some(n) => request.query(&[
                    ("maxAlternatives", n.as_str()),
                    ("alternativeRouteType", "anyRoute"),
                ]),
                None => request,
            }
        })
        .await?;

        let status = resp.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::NOT_FOUND {
            info!("[Directions] {} for {} -> no routes", status, query);
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(OverlayError::ExternalServiceUnavailable(format!("HTTP {}", status)));
        }

        let data: DirectionsResponse = read_json("Directions", resp, started).await?;
        info!("[Directions] {} routes for {} in {:?}", data.routes.len(), query, started.elapsed());
        Ok(data.routes)
    }
}

#[async_trait]
impl Geocoder for AzureMapsClient {
    async fn resolve(&self, place: &str) -> Result<Option<GeoPoint>> {
        let url = format!("{}/search/address/json", self.config.maps_base_url);
        let started = Instant::now();

        let resp = send_with_retry("Geocode", || {
            self.client.get(&url).query(&[
                ("api-version", MAPS_API_VERSION),
                ("subscription-key", self.config.subscription_key.as_str()),
                ("query", place),
            ])
        })
        .await?;

        if !resp.status().is_success() {
            return Err(OverlayError::ExternalServiceUnavailable(format!("HTTP {}", resp.status())));
        }

        let data: SearchResponse = read_json("Geocode", resp, started).await?;
        let point = data
            .results
            .into_iter()
            .next()
            .and_then(|r| r.position)
            .map(|p| GeoPoint::new(p.lat, p.lon));
        info!("[Geocode] '{}' -> {:?}", place, point);
        Ok(point)
    }
}

#[async_trait]
impl RoutingService for AzureMapsClient {
    async fn route(
        &self,
        source: GeoPoint,
        destination: GeoPoint,
        max_alternatives: u32,
    ) -> Result<Vec<ProviderRoute>> {
        self.directions(&[source, destination], Some(max_alternatives)).await
    }

    async fn route_via(
        &self,
        source: GeoPoint,
        via: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Option<ProviderRoute>> {
        Ok(self.directions(&[source, via, destination], None).await?.into_iter().next())
    }
}

// ============================================================================
// Prediction client
// ============================================================================

/// Point safety predictions from the prediction server.
///
/// One HTTP request per prediction. A 429 or connection failure is an error
/// that the classifier turns into the default label.
pub struct PredictionClient {
    client: Client,
    url: String,
}

impl PredictionClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        Ok(Self { client: config.build_client()?, url: config.prediction_url.clone() })
    }
}

#[async_trait]
impl SafetyPredictor for PredictionClient {
    async fn predict(&self, point: GeoPoint) -> Result<Prediction> {
        let started = Instant::now();
        let body = PredictRequest { lat: point.lat, lon: point.lon };

        let resp = send_once("Predict", self.client.post(&self.url).json(&body)).await?;
        if !resp.status().is_success() {
            return Err(OverlayError::ExternalServiceUnavailable(format!("HTTP {}", resp.status())));
        }

        let data: PredictResponse = read_json("Predict", resp, started).await?;
        Ok(data.into())
    }
}
