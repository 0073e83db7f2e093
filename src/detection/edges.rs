use image::{GrayImage, Luma};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

/// Pixel value marking an edge in the output map
pub const EDGE: u8 = 255;

// tan(22.5°) and tan(67.5°), sector bounds for gradient direction
const TAN_22_5: f32 = 0.414_213_56;
const TAN_67_5: f32 = 2.414_213_6;

const NEIGHBOURS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Binary edge map with dual-threshold hysteresis.
///
/// Gradient magnitude is the L1 norm of the Sobel responses. After
/// non-maximum suppression, pixels above `high_threshold` are edges, and
/// pixels above `low_threshold` become edges only when 8-connected to an
/// edge. Border pixels are never edges.
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut out = GrayImage::new(width, height);
    if width < 3 || height < 3 {
        return out;
    }

    let gx = horizontal_sobel(img);
    let gy = vertical_sobel(img);
    let w = width as usize;
    let h = height as usize;

    let magnitude: Vec<f32> = gx
        .pixels()
        .zip(gy.pixels())
        .map(|(a, b)| (a[0] as f32).abs() + (b[0] as f32).abs())
        .collect();

    // 0 = none, 1 = weak candidate, 2 = edge
    let mut state = vec![0u8; w * h];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let i = y * w + x;
            let m = magnitude[i];
            if m <= low_threshold {
                continue;
            }

            let dx = gx.get_pixel(x as u32, y as u32)[0] as f32;
            let dy = gy.get_pixel(x as u32, y as u32)[0] as f32;
            let (before, after) = suppression_neighbours(dx, dy, w, i);

            if !(m > magnitude[before] && m >= magnitude[after]) {
                continue;
            }

            if m > high_threshold {
                state[i] = 2;
                stack.push((x, y));
            } else {
                state[i] = 1;
            }
        }
    }

    while let Some((x, y)) = stack.pop() {
        for (ox, oy) in NEIGHBOURS {
            let nx = x as i32 + ox;
            let ny = y as i32 + oy;
            if nx < 1 || ny < 1 || nx >= w as i32 - 1 || ny >= h as i32 - 1 {
                continue;
            }
            let j = ny as usize * w + nx as usize;
            if state[j] == 1 {
                state[j] = 2;
                stack.push((nx as usize, ny as usize));
            }
        }
    }

    for (i, s) in state.iter().enumerate() {
        if *s == 2 {
            out.put_pixel((i % w) as u32, (i / w) as u32, Luma([EDGE]));
        }
    }

    out
}

/// Indices of the two neighbours along the gradient direction at `i`.
fn suppression_neighbours(dx: f32, dy: f32, w: usize, i: usize) -> (usize, usize) {
    let ax = dx.abs();
    let ay = dy.abs();

    if ay <= ax * TAN_22_5 {
        (i - 1, i + 1)
    } else if ay >= ax * TAN_67_5 {
        (i - w, i + w)
    } else if (dx > 0.0) == (dy > 0.0) {
        (i - w - 1, i + w + 1)
    } else {
        (i - w + 1, i + w - 1)
    }
}
