use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a box-counting run.
///
/// An empty result is never an error: a run that finds nothing returns a
/// `DetectionResult` with `count == 0`.
#[derive(Debug, Error)]
pub enum DetectError {
    /// The vision primitives could not be brought up. Callers should keep
    /// the run action disabled until they retry initialization.
    #[error("vision runtime unavailable: {reason}")]
    RuntimeUnavailable { reason: String },

    /// The image has zero width or height, or could not be decoded.
    #[error("invalid image: {reason}")]
    InvalidImage { reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse config from {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("step '{step}' failed: {reason}")]
    Step { step: String, reason: String },

    #[error("failed to write debug image {path}: {source}")]
    DebugOutput {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DetectError {
    pub fn runtime_unavailable(reason: impl Into<String>) -> Self {
        Self::RuntimeUnavailable {
            reason: reason.into(),
        }
    }

    pub fn invalid_image(reason: impl Into<String>) -> Self {
        Self::InvalidImage {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DetectError>;
