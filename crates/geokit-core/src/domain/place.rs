use serde::{Deserialize, Serialize};

use crate::{BoundingBox, Coordinate, ProviderId};

/// Provider-neutral geocoding result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub provider: ProviderId,
    pub label: String,
    pub coordinate: Coordinate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<BoundingBox>,
    /// Provider confidence normalized to `0.0..=1.0`, when the provider reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Place {
    pub fn new(provider: ProviderId, label: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            provider,
            label: label.into(),
            coordinate,
            bounds: None,
            confidence: None,
        }
    }

    pub fn with_bounds(mut self, bounds: Option<BoundingBox>) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_confidence(mut self, confidence: Option<f64>) -> Self {
        self.confidence = confidence.map(|value| value.clamp(0.0, 1.0));
        self
    }
}
