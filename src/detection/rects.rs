use crate::config::ClassificationThresholds;
use crate::models::{BoundingRect, Contour};

/// Verdict for a single contour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub accept: bool,
    pub rect: BoundingRect,
}

/// Decide whether a contour is a counted box.
///
/// Purely geometric: any rectangular artifact with the right footprint is
/// accepted too.
pub fn classify(contour: &Contour, thresholds: &ClassificationThresholds) -> Classification {
    let rect = contour.bounding_rect();
    Classification {
        accept: thresholds.accepts(&rect),
        rect,
    }
}

/// Bounding rects of the accepted contours, in input order
pub fn filter_boxes(contours: &[Contour], thresholds: &ClassificationThresholds) -> Vec<BoundingRect> {
    contours
        .iter()
        .map(|c| classify(c, thresholds))
        .filter(|c| c.accept)
        .map(|c| c.rect)
        .collect()
}
