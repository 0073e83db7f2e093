pub mod annotate;
pub mod contours;
pub mod edges;
pub mod preprocessing;
pub mod rects;
pub mod steps;

use image::{DynamicImage, GrayImage};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{ClassificationThresholds, DetectorConfig};
use crate::error::Result;
use crate::models::{BoundingRect, Contour, DetectionResult};
use crate::pipeline::{Pipeline, Stage};

/// Counts boxes in still images.
///
/// Holds only read-only configuration and the step pipeline, so one
/// counter can serve any number of sequential runs.
#[derive(Clone)]
pub struct BoxCounter {
    pipeline: Pipeline,
    config: DetectorConfig,
}

impl BoxCounter {
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            pipeline: build_standard_pipeline(&config),
            config,
        })
    }

    /// Use a custom step pipeline. Its final items' bounding rects are
    /// reported as the accepted boxes.
    pub fn with_pipeline(pipeline: Pipeline, config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { pipeline, config })
    }

    /// Save every intermediate image under `output_dir`
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        self.pipeline = self.pipeline.with_debug(output_dir)?;
        Ok(self)
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Run the full pipeline on one image
    pub fn count(&self, image: &DynamicImage) -> Result<DetectionResult> {
        preprocessing::check_dimensions(image)?;

        let survivors = self.pipeline.run(image.clone())?;
        let boxes: Vec<BoundingRect> = survivors.iter().filter_map(|item| item.bbox).collect();

        debug!(from = ?Stage::Classifying, to = ?Stage::Annotating, "stage transition");
        let annotated = annotate::draw_boxes(image, &boxes, &self.config.annotation);
        self.pipeline.save_debug_images(
            self.pipeline.len() + 1,
            "annotation",
            &[DynamicImage::ImageRgba8(annotated.clone())],
        )?;
        debug!(from = ?Stage::Annotating, to = ?Stage::Done, "stage transition");

        info!(
            count = boxes.len(),
            width = image.width(),
            height = image.height(),
            "box count complete"
        );

        Ok(DetectionResult {
            count: boxes.len(),
            boxes,
            annotated,
        })
    }

    /// Binary edge map of an image (for debugging)
    pub fn edge_map(&self, image: &DynamicImage) -> Result<GrayImage> {
        let gray = preprocessing::preprocess(image)?;
        Ok(edges::detect_edges(
            &gray,
            self.config.edges.low,
            self.config.edges.high,
        ))
    }

    /// All outer contours of an image, before classification (for debugging)
    pub fn contours(&self, image: &DynamicImage) -> Result<Vec<Contour>> {
        Ok(contours::find_external_contours(&self.edge_map(image)?))
    }
}

/// Count boxes with default edge and annotation settings
pub fn detect_boxes(image: &DynamicImage, thresholds: ClassificationThresholds) -> Result<DetectionResult> {
    BoxCounter::new(DetectorConfig::default().with_thresholds(thresholds))?.count(image)
}

/// Build the standard counting pipeline using the composable pipeline system
pub fn build_standard_pipeline(config: &DetectorConfig) -> Pipeline {
    use steps::*;

    Pipeline::new()
        .add_step(Arc::new(GrayscaleStep))
        .add_step(Arc::new(BlurStep))
        .add_step(Arc::new(EdgeDetectionStep {
            thresholds: config.edges,
        }))
        .add_step(Arc::new(ContourDetectionStep))
        .add_step(Arc::new(RectFilterStep {
            thresholds: config.thresholds,
        }))
}
