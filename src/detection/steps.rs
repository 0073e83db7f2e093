use crate::config::{ClassificationThresholds, EdgeThresholds};
use crate::detection::{contours, edges, preprocessing, rects};
use crate::error::{DetectError, Result};
use crate::pipeline::{MetadataValue, PipelineContext, PipelineData, PipelineStep, Stage};
use image::DynamicImage;
use tracing::trace;

/// Convert image to grayscale
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::with_capacity(data.len());
        for item in data {
            preprocessing::check_dimensions(&item.image)?;
            let gray = preprocessing::to_grayscale(&item.image);
            result.push(item.with_image(DynamicImage::ImageLuma8(gray)));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }

    fn stage(&self) -> Stage {
        Stage::Preprocessing
    }
}

/// Apply the 3x3 Gaussian blur
pub struct BlurStep;

impl PipelineStep for BlurStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::with_capacity(data.len());
        for item in data {
            let gray = item.image.to_luma8();
            let blurred = preprocessing::apply_blur(&gray);
            result.push(item.with_image(DynamicImage::ImageLuma8(blurred)));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Gaussian Blur"
    }

    fn stage(&self) -> Stage {
        Stage::Preprocessing
    }
}

/// Hysteresis edge detection
pub struct EdgeDetectionStep {
    pub thresholds: EdgeThresholds,
}

impl PipelineStep for EdgeDetectionStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::with_capacity(data.len());
        for item in data {
            let gray = item.image.to_luma8();
            let edge_map = edges::detect_edges(&gray, self.thresholds.low, self.thresholds.high);
            result.push(item.with_image(DynamicImage::ImageLuma8(edge_map)));
        }
        Ok(result)
    }

    fn name(&self) -> &str {
        "Edge Detection"
    }

    fn stage(&self) -> Stage {
        Stage::EdgeDetecting
    }
}

/// Trace outer contours in the edge map - splits one image into one item
/// per contour, each cropped from the original to its bounding rect
pub struct ContourDetectionStep;

impl PipelineStep for ContourDetectionStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();

        for item in data {
            let edge_map = item.image.to_luma8();

            for contour in contours::find_external_contours(&edge_map) {
                let rect = contour.bounding_rect();
                let cropped = item.original.crop_imm(rect.x, rect.y, rect.width, rect.height);
                let vertices = contour.len() as i64;

                let region = PipelineData::from_contour(cropped, item.original.clone(), contour)
                    .with_metadata("vertices", MetadataValue::Int(vertices));
                result.push(region);
            }
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "Contour Detection"
    }

    fn stage(&self) -> Stage {
        Stage::ContourExtracting
    }
}

/// Keep only contours whose bounding rect fits the box window
pub struct RectFilterStep {
    pub thresholds: ClassificationThresholds,
}

impl PipelineStep for RectFilterStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();

        for item in data {
            let contour = item.contour.as_ref().ok_or_else(|| DetectError::Step {
                step: self.name().to_string(),
                reason: "item carries no contour".to_string(),
            })?;

            let verdict = rects::classify(contour, &self.thresholds);
            let rect = verdict.rect;
            trace!(
                x = rect.x,
                y = rect.y,
                width = rect.width,
                height = rect.height,
                accept = verdict.accept,
                "classified contour"
            );

            if verdict.accept {
                let aspect = rect.aspect_ratio().unwrap_or(0.0);
                let new_item = item
                    .clone()
                    .with_metadata("aspect_ratio", MetadataValue::Float(aspect))
                    .with_metadata("area", MetadataValue::Int(rect.area() as i64))
                    .with_metadata("accepted", MetadataValue::Bool(true));
                result.push(new_item);
            }
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "Box Filtering"
    }

    fn stage(&self) -> Stage {
        Stage::Classifying
    }
}
