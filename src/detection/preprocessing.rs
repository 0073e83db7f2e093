use image::{DynamicImage, GenericImageView, GrayImage};
use imageproc::filter::separable_filter_equal;

use crate::error::{DetectError, Result};

/// 3-tap Gaussian weights (σ ≈ 0.8), applied along both axes.
pub const BLUR_KERNEL: [f32; 3] = [0.25, 0.5, 0.25];

/// Reject images with no pixels
pub fn check_dimensions(img: &DynamicImage) -> Result<()> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(DetectError::invalid_image(format!(
            "image has zero extent ({width}x{height})"
        )));
    }
    Ok(())
}

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Apply the 3x3 Gaussian blur to suppress sensor and compression noise
pub fn apply_blur(img: &GrayImage) -> GrayImage {
    separable_filter_equal(img, &BLUR_KERNEL)
}

/// Grayscale and blur in one go
pub fn preprocess(img: &DynamicImage) -> Result<GrayImage> {
    check_dimensions(img)?;
    Ok(apply_blur(&to_grayscale(img)))
}
