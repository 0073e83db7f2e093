mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from boxcount for tests
pub use boxcount::{
    BoundingRect, BoxCounter, ClassificationThresholds, DetectError, DetectionResult,
    DetectorConfig, detect_boxes,
};
