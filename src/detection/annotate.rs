use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;

use crate::config::Annotation;
use crate::models::BoundingRect;

/// Draw an outline around each box on an RGBA copy of `original`.
///
/// The stroke grows inward from the rect's outer edge, so no pixel outside
/// a box is touched.
pub fn draw_boxes(original: &DynamicImage, boxes: &[BoundingRect], style: &Annotation) -> RgbaImage {
    let mut canvas = original.to_rgba8();
    let color = Rgba(style.color);

    for rect in boxes {
        for inset in 0..style.stroke_width {
            if rect.width <= 2 * inset || rect.height <= 2 * inset {
                break;
            }
            let inner = BoundingRect::new(
                rect.x + inset,
                rect.y + inset,
                rect.width - 2 * inset,
                rect.height - 2 * inset,
            );
            if let Some(r) = inner.to_rect() {
                draw_hollow_rect_mut(&mut canvas, r, color);
            }
        }
    }

    canvas
}
