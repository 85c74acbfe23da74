//! Per-point safety classification with a fixed fallback.

use std::sync::Arc;

use log::{debug, warn};

use crate::{GeoPoint, SafetyLabel, SafetyLevel, SafetyPredictor};

/// Classifies points through an external [`SafetyPredictor`].
///
/// Classification never fails: when disabled, when no predictor is attached,
/// or when the predictor errors, the result is [`SafetyLabel::default`].
#[derive(Clone, Default)]
pub struct SafetyClassifier {
    predictor: Option<Arc<dyn SafetyPredictor>>,
}

impl SafetyClassifier {
    pub fn new(predictor: Arc<dyn SafetyPredictor>) -> Self {
        Self { predictor: Some(predictor) }
    }

    /// A classifier that always yields the default label.
    pub fn disabled() -> Self {
        Self { predictor: None }
    }

    /// Classify one point. Issues exactly one prediction request when
    /// `enabled` and a predictor is attached, none otherwise.
    pub async fn classify(&self, point: GeoPoint, enabled: bool) -> SafetyLabel {
        if !enabled {
            return SafetyLabel::default();
        }
        let Some(predictor) = &self.predictor else {
            return SafetyLabel::default();
        };

        match predictor.predict(point).await {
            Ok(prediction) => {
                let level = prediction
                    .label
                    .as_deref()
                    .map(SafetyLevel::from_label)
                    .unwrap_or_default();
                let label = SafetyLabel::new(level, prediction.incident_count.unwrap_or(0));
                debug!(
                    "[SafetyClassifier] ({:.5}, {:.5}) -> {} ({} incidents)",
                    point.lat, point.lon, label.level, label.incident_count
                );
                label
            }
            Err(e) => {
                warn!(
                    "[SafetyClassifier] Prediction failed at ({:.5}, {:.5}): {}, using default",
                    point.lat, point.lon, e
                );
                SafetyLabel::default()
            }
        }
    }
}

impl std::fmt::Debug for SafetyClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafetyClassifier")
            .field("has_predictor", &self.predictor.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubPredictor;
    use crate::{OverlayError, Prediction};

    const POINT: GeoPoint = GeoPoint { lat: 13.08, lon: 80.27 };

    #[tokio::test]
    async fn test_disabled_makes_no_calls() {
        let predictor = Arc::new(StubPredictor::default().label(POINT, "Unsafe", 4));
        let classifier = SafetyClassifier::new(predictor.clone());

        let label = classifier.classify(POINT, false).await;
        assert_eq!(label, SafetyLabel::default());
        assert_eq!(predictor.call_count(), 0);
    }

    #[tokio::test]
    async fn test_enabled_uses_prediction() {
        let predictor = Arc::new(StubPredictor::default().label(POINT, "Unsafe", 4));
        let classifier = SafetyClassifier::new(predictor.clone());

        let label = classifier.classify(POINT, true).await;
        assert_eq!(label, SafetyLabel::new(SafetyLevel::Unsafe, 4));
        assert_eq!(predictor.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_default() {
        let predictor = Arc::new(StubPredictor::default().with(
            POINT,
            Err(OverlayError::ExternalServiceUnavailable("HTTP 500".to_string())),
        ));
        let classifier = SafetyClassifier::new(predictor);

        assert_eq!(classifier.classify(POINT, true).await, SafetyLabel::default());
    }

    #[tokio::test]
    async fn test_missing_fields_use_defaults() {
        let predictor = Arc::new(
            StubPredictor::default()
                .with(POINT, Ok(Prediction { label: Some("Moderate".to_string()), incident_count: None })),
        );
        let classifier = SafetyClassifier::new(predictor);
        assert_eq!(
            classifier.classify(POINT, true).await,
            SafetyLabel::new(SafetyLevel::Moderate, 0)
        );

        let other = GeoPoint::new(1.0, 1.0);
        assert_eq!(classifier.classify(other, true).await, SafetyLabel::default());
    }

    #[tokio::test]
    async fn test_unrecognized_label_is_safe() {
        let predictor = Arc::new(StubPredictor::default().label(POINT, "Hazardous", 2));
        let classifier = SafetyClassifier::new(predictor);
        assert_eq!(
            classifier.classify(POINT, true).await,
            SafetyLabel::new(SafetyLevel::Safe, 2)
        );
    }

    #[tokio::test]
    async fn test_without_predictor_is_default() {
        assert_eq!(SafetyClassifier::disabled().classify(POINT, true).await, SafetyLabel::default());
    }
}
