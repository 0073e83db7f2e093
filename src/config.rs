use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{DetectError, Result};
use crate::models::BoundingRect;

/// Geometric acceptance window for a counted box.
///
/// The defaults describe the on-screen footprint of the boxes at a known
/// camera distance. Comparisons are strict on both ends, so a rect whose
/// aspect or area lands exactly on a bound is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationThresholds {
    pub aspect_min: f64,
    pub aspect_max: f64,
    pub area_min: u64,
    pub area_max: u64,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            aspect_min: 0.8,
            aspect_max: 1.25,
            area_min: 1400,
            area_max: 18000,
        }
    }
}

impl ClassificationThresholds {
    pub fn accepts(&self, rect: &BoundingRect) -> bool {
        let Some(aspect) = rect.aspect_ratio() else {
            return false;
        };
        let area = rect.area();

        aspect > self.aspect_min
            && aspect < self.aspect_max
            && area > self.area_min
            && area < self.area_max
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.aspect_min.is_finite() && self.aspect_max.is_finite()) {
            return Err(DetectError::InvalidConfig(
                "aspect bounds must be finite".to_string(),
            ));
        }
        if self.aspect_min >= self.aspect_max {
            return Err(DetectError::InvalidConfig(format!(
                "aspect_min ({}) must be below aspect_max ({})",
                self.aspect_min, self.aspect_max
            )));
        }
        if self.area_min >= self.area_max {
            return Err(DetectError::InvalidConfig(format!(
                "area_min ({}) must be below area_max ({})",
                self.area_min, self.area_max
            )));
        }
        Ok(())
    }
}

/// Gradient-magnitude thresholds for hysteresis edge detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeThresholds {
    pub low: f32,
    pub high: f32,
}

impl Default for EdgeThresholds {
    fn default() -> Self {
        Self {
            low: 50.0,
            high: 150.0,
        }
    }
}

impl EdgeThresholds {
    pub fn validate(&self) -> Result<()> {
        if !(self.low >= 0.0 && self.low <= self.high) {
            return Err(DetectError::InvalidConfig(format!(
                "edge thresholds must satisfy 0 <= low <= high (low={}, high={})",
                self.low, self.high
            )));
        }
        Ok(())
    }
}

/// Outline style for accepted boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotation {
    /// RGBA stroke color.
    pub color: [u8; 4],
    pub stroke_width: u32,
}

impl Default for Annotation {
    fn default() -> Self {
        Self {
            color: [255, 0, 0, 255],
            stroke_width: 2,
        }
    }
}

/// Complete detector configuration. Read-only for the duration of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub thresholds: ClassificationThresholds,
    pub edges: EdgeThresholds,
    pub annotation: Annotation,
}

impl DetectorConfig {
    pub fn with_thresholds(mut self, thresholds: ClassificationThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Load a config from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text).map_err(|source| DetectError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        self.edges.validate()?;
        if self.annotation.stroke_width == 0 {
            return Err(DetectError::InvalidConfig(
                "stroke_width must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
