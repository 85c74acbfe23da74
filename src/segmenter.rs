//! Splitting route geometries into colored, labeled segments.

use std::time::Instant;

use log::info;

use crate::{Palette, RouteGeometry, RouteKind, SafetyClassifier, Segment};

/// Produces the renderable segments of a route.
#[derive(Debug, Clone, Default)]
pub struct RouteSegmenter {
    classifier: SafetyClassifier,
    palette: Palette,
}

impl RouteSegmenter {
    pub fn new(classifier: SafetyClassifier, palette: Palette) -> Self {
        Self { classifier, palette }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Segment a geometry of N points into exactly N-1 segments in point order.
    ///
    /// Each segment is labeled by classifying its *first* point. With
    /// classification enabled the color follows the label; disabled, every
    /// segment gets the fixed color for `kind`.
    ///
    /// Classification requests are awaited one at a time in point order, so
    /// each segment carries its own point's label.
    pub async fn segment(
        &self,
        geometry: &RouteGeometry,
        kind: RouteKind,
        classification_enabled: bool,
    ) -> Vec<Segment> {
        let start = Instant::now();
        let mut segments = Vec::with_capacity(geometry.len() - 1);

        for pair in geometry.points().windows(2) {
            let label = self.classifier.classify(pair[0], classification_enabled).await;
            let color = if classification_enabled {
                self.palette.for_level(label.level)
            } else {
                self.palette.for_kind(kind)
            };
            segments.push(Segment { start: pair[0], end: pair[1], kind, label, color });
        }

        info!(
            "[RouteSegmenter] {} route: {} segments (classification {}) in {:?}",
            kind.as_str(),
            segments.len(),
            if classification_enabled { "on" } else { "off" },
            start.elapsed()
        );

        segments
    }
}
