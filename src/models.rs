use image::RgbaImage;
use imageproc::point::Point;
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};

/// Closed boundary of one connected edge component, in tracing order.
///
/// Collinear runs are stored by their endpoints only, which keeps every
/// extreme point and therefore the bounding rectangle intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Smallest axis-aligned rectangle enclosing every point.
    ///
    /// An empty contour yields a zero-sized rect, which no classifier window
    /// accepts.
    pub fn bounding_rect(&self) -> BoundingRect {
        let Some(first) = self.points.first() else {
            return BoundingRect::default();
        };

        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        BoundingRect {
            x: min_x.max(0) as u32,
            y: min_y.max(0) as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        }
    }
}

/// Axis-aligned bounding rectangle in image pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// `width / height`, or `None` for a degenerate rect with no height.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.height == 0 {
            return None;
        }
        Some(self.width as f64 / self.height as f64)
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Last column covered by the rect (inclusive).
    pub fn right(&self) -> u32 {
        (self.x + self.width).saturating_sub(1)
    }

    /// Last row covered by the rect (inclusive).
    pub fn bottom(&self) -> u32 {
        (self.y + self.height).saturating_sub(1)
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.width > 0
            && self.height > 0
            && x >= self.x
            && x <= self.right()
            && y >= self.y
            && y <= self.bottom()
    }

    /// Converts to an `imageproc` rect for drawing. Zero-sized rects have no
    /// drawable counterpart.
    pub fn to_rect(&self) -> Option<Rect> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some(Rect::at(self.x as i32, self.y as i32).of_size(self.width, self.height))
    }
}

/// Output of one counting run.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    pub count: usize,
    /// Accepted rects in the order their contours were found (raster order).
    pub boxes: Vec<BoundingRect>,
    /// The input image with an outline drawn around every accepted rect.
    pub annotated: RgbaImage,
}

impl DetectionResult {
    pub fn report(&self) -> DetectionReport {
        DetectionReport {
            count: self.count,
            boxes: self.boxes.clone(),
        }
    }
}

/// Serializable part of a `DetectionResult`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub count: usize,
    pub boxes: Vec<BoundingRect>,
}
