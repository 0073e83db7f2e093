#![allow(dead_code)]

use boxcount::BoundingRect;
use image::{DynamicImage, Rgb, RgbImage};

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Top-left corners of the five 40x40 squares in `five_squares()`
pub const SQUARE_ORIGINS: [(u32, u32); 5] = [(20, 30), (100, 30), (180, 30), (60, 120), (220, 120)];
pub const SQUARE_SIDE: u32 = 40;

/// Creates a width x height image filled with one color.
pub fn canvas(width: u32, height: u32, color: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(width, height, color)
}

/// Fills the axis-aligned rect at (x, y) with `color`.
pub fn fill_rect(img: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    for py in y..y + height {
        for px in x..x + width {
            img.put_pixel(px, py, color);
        }
    }
}

/// 300x200 black image with five non-overlapping white 40x40 squares.
pub fn five_squares() -> DynamicImage {
    let mut img = canvas(300, 200, BLACK);
    for (x, y) in SQUARE_ORIGINS {
        fill_rect(&mut img, x, y, SQUARE_SIDE, SQUARE_SIDE, WHITE);
    }
    DynamicImage::ImageRgb8(img)
}

/// One white rect of the given size on a black background with a 30px margin.
pub fn single_rect(width: u32, height: u32) -> DynamicImage {
    let mut img = canvas(width + 60, height + 60, BLACK);
    fill_rect(&mut img, 30, 30, width, height, WHITE);
    DynamicImage::ImageRgb8(img)
}

/// True when `rect` sits within `tolerance` pixels of the square drawn at `origin`.
pub fn approximates(rect: &BoundingRect, origin: (u32, u32), side: u32, tolerance: u32) -> bool {
    rect.x.abs_diff(origin.0) <= tolerance
        && rect.y.abs_diff(origin.1) <= tolerance
        && rect.width.abs_diff(side) <= tolerance
        && rect.height.abs_diff(side) <= tolerance
}
