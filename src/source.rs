use image::{DynamicImage, ImageReader};
use std::path::Path;

use crate::detection::preprocessing::check_dimensions;
use crate::error::{DetectError, Result};

/// Open and decode an image file. Unreadable, undecodable and empty
/// images all map to `InvalidImage`.
pub fn load_image(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let path = path.as_ref();
    let img = ImageReader::open(path)
        .map_err(|e| DetectError::invalid_image(format!("{}: {e}", path.display())))?
        .with_guessed_format()
        .map_err(|e| DetectError::invalid_image(format!("{}: {e}", path.display())))?
        .decode()
        .map_err(|e| DetectError::invalid_image(format!("failed to decode {}: {e}", path.display())))?;

    check_dimensions(&img)?;
    Ok(img)
}

/// Decode an in-memory image, e.g. an uploaded file
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| DetectError::invalid_image(format!("failed to decode image: {e}")))?;
    check_dimensions(&img)?;
    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_invalid() {
        assert!(matches!(
            decode_image(b"not an image"),
            Err(DetectError::InvalidImage { .. })
        ));
    }

    #[test]
    fn missing_file_is_invalid() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            load_image(dir.path().join("nope.png")),
            Err(DetectError::InvalidImage { .. })
        ));
    }
}
