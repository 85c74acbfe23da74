//! Error types for route overlay operations.

/// Errors surfaced by the route overlay.
///
/// Only [`OverlayError::InvalidLocation`], [`OverlayError::NoRouteFound`],
/// [`OverlayError::PrimaryRouteMissing`] and [`OverlayError::MalformedRoute`]
/// reach callers of the session. [`OverlayError::ExternalServiceUnavailable`]
/// is produced by collaborators and absorbed by the classifier and the
/// alternate route composer; it only surfaces from primary route and
/// geocoding requests.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OverlayError {
    /// Geocoding found no match for a place name
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    /// The routing provider returned zero routes
    #[error("No route found")]
    NoRouteFound,

    /// An alternate route was requested before any primary route exists
    #[error("Primary route missing: compute a primary route first")]
    PrimaryRouteMissing,

    /// A provider response lacks the expected geometry
    #[error("Malformed route: {0}")]
    MalformedRoute(String),

    /// Transport failure or non-success response from an external service
    #[error("External service unavailable: {0}")]
    ExternalServiceUnavailable(String),
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for OverlayError {
    fn from(e: reqwest::Error) -> Self {
        OverlayError::ExternalServiceUnavailable(e.to_string())
    }
}

#[cfg(feature = "http")]
impl From<serde_json::Error> for OverlayError {
    fn from(e: serde_json::Error) -> Self {
        OverlayError::ExternalServiceUnavailable(format!("JSON parse error: {}", e))
    }
}

/// Result alias for overlay operations.
pub type Result<T> = std::result::Result<T, OverlayError>;
