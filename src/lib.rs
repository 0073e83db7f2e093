pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod session;
pub mod source;

pub use config::{Annotation, ClassificationThresholds, DetectorConfig, EdgeThresholds};
pub use detection::{BoxCounter, build_standard_pipeline, detect_boxes};
pub use error::{DetectError, Result};
pub use models::{BoundingRect, Contour, DetectionReport, DetectionResult};
pub use pipeline::{
    DebugConfig, MetadataValue, Pipeline, PipelineContext, PipelineData, PipelineStep, Stage,
};
pub use session::{Readiness, Session, SharedSession};
