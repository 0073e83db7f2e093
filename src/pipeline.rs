use image::DynamicImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::error::{DetectError, Result};
use crate::models::{BoundingRect, Contour};

/// Where a run currently is. A run always starts at `Idle` and ends at
/// `Done`; nothing is carried over between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Idle,
    Preprocessing,
    EdgeDetecting,
    ContourExtracting,
    Classifying,
    Annotating,
    Done,
}

/// Data that flows through the pipeline.
/// Each PipelineData is either the whole image or one candidate region.
#[derive(Clone)]
pub struct PipelineData {
    /// The working image (color, grayscale, edge map, or a region crop)
    pub image: DynamicImage,

    /// The untouched input image, shared between all regions
    pub original: Arc<DynamicImage>,

    /// Bounding rect in the original image (None means full image)
    pub bbox: Option<BoundingRect>,

    /// Traced boundary this region was cut from
    pub contour: Option<Contour>,

    /// Per-item measurements (e.g. "aspect_ratio", "area")
    pub metadata: HashMap<String, MetadataValue>,
}

/// Metadata value types
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Bool(bool),
    Float(f64),
    Int(i64),
}

impl PipelineData {
    /// Create PipelineData for a full image
    pub fn from_image(image: DynamicImage) -> Self {
        let original = Arc::new(image.clone());
        Self {
            image,
            original,
            bbox: None,
            contour: None,
            metadata: HashMap::new(),
        }
    }

    /// Create PipelineData for the region enclosed by a contour
    pub fn from_contour(image: DynamicImage, original: Arc<DynamicImage>, contour: Contour) -> Self {
        Self {
            image,
            original,
            bbox: Some(contour.bounding_rect()),
            contour: Some(contour),
            metadata: HashMap::new(),
        }
    }

    /// Same item with a different working image
    pub fn with_image(&self, image: DynamicImage) -> Self {
        Self {
            image,
            original: self.original.clone(),
            bbox: self.bbox,
            contour: self.contour.clone(),
            metadata: self.metadata.clone(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.metadata.get(key) {
            Some(MetadataValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Int(v)) => Some(*v),
            _ => None,
        }
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// Context available to all pipeline steps
#[derive(Clone, Default)]
pub struct PipelineContext {
    pub debug: Option<DebugConfig>,
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Process data and return transformed data.
    /// Steps can split data (1 → many), filter (many → fewer), or transform (many → many).
    fn process(&self, data: Vec<PipelineData>, context: &PipelineContext) -> Result<Vec<PipelineData>>;

    /// Human-readable name for this step (used in logs and debug directory names)
    fn name(&self) -> &str;

    /// Run stage this step belongs to
    fn stage(&self) -> Stage;
}

/// Composable pipeline builder
#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable debug mode with output directory.
    /// The directory must be empty or non-existent.
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(DetectError::InvalidConfig(format!(
                    "debug directory is not empty: {}",
                    output_dir.display()
                )));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Helper method to add a step from a Box
    pub fn add_step_boxed(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.steps.push(Arc::from(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order on an input image.
    /// The first failing step aborts the run.
    pub fn run(&self, input: DynamicImage) -> Result<Vec<PipelineData>> {
        self.run_partial(input, self.steps.len())
    }

    /// Run only the first `num_steps` steps (useful for inspecting
    /// intermediate images)
    pub fn run_partial(&self, input: DynamicImage, num_steps: usize) -> Result<Vec<PipelineData>> {
        self.save_debug_images(0, "input", std::slice::from_ref(&input))?;

        let mut data = vec![PipelineData::from_image(input)];
        let mut stage = Stage::Idle;

        for (step_idx, step) in self.steps.iter().take(num_steps).enumerate() {
            if step.stage() != stage {
                debug!(from = ?stage, to = ?step.stage(), "stage transition");
                stage = step.stage();
            }
            debug!(step = step.name(), items = data.len(), "running step");

            data = step.process(data, &self.context)?;

            let images: Vec<DynamicImage> = data.iter().map(|d| d.image.clone()).collect();
            self.save_debug_images(step_idx + 1, step.name(), &images)?;

            debug!(step = step.name(), items = data.len(), "step finished");
        }

        Ok(data)
    }

    /// Write images to `NN_<step_name>/MM.png` when debug mode is on.
    pub fn save_debug_images(&self, step_index: usize, step_name: &str, images: &[DynamicImage]) -> Result<()> {
        let Some(debug_config) = &self.context.debug else {
            return Ok(());
        };

        let step_dir_name = debug_dir_name(step_index, step_name);
        let step_dir = debug_config.output_dir.join(&step_dir_name);
        std::fs::create_dir_all(&step_dir)?;

        for (idx, image) in images.iter().enumerate() {
            let output_path = step_dir.join(format!("{:02}.png", idx + 1));
            save_png(image, &output_path)?;
        }

        debug!(count = images.len(), dir = %step_dir_name, "saved debug images");
        Ok(())
    }
}

fn debug_dir_name(step_index: usize, step_name: &str) -> String {
    format!("{:02}_{}", step_index, step_name.to_lowercase().replace(' ', "_"))
}

fn save_png(image: &DynamicImage, path: &Path) -> Result<()> {
    image.save(path).map_err(|source| DetectError::DebugOutput {
        path: path.to_path_buf(),
        source,
    })
}
