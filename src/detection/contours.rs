use image::GrayImage;
use imageproc::point::Point;

use crate::models::Contour;

/// 8-neighbourhood offsets in counter-clockwise order (image y grows downward).
const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BorderKind {
    Outer,
    Hole,
}

#[derive(Debug, Clone, Copy)]
struct Border {
    kind: BorderKind,
    /// Border number of the enclosing border; the frame is border 1.
    parent: i32,
}

const FRAME: i32 = 1;

/// Zero-padded label grid. Foreground starts as 1; traced borders are
/// overwritten with their border number (negated on the right side of a run).
struct LabelGrid {
    cells: Vec<i32>,
    stride: i32,
}

impl LabelGrid {
    fn from_edges(edges: &GrayImage) -> Self {
        let (width, height) = edges.dimensions();
        let stride = width as i32 + 2;
        let mut cells = vec![0i32; (stride * (height as i32 + 2)) as usize];
        for (x, y, p) in edges.enumerate_pixels() {
            if p[0] != 0 {
                cells[((y as i32 + 1) * stride + x as i32 + 1) as usize] = 1;
            }
        }
        Self { cells, stride }
    }

    fn get(&self, x: i32, y: i32) -> i32 {
        self.cells[(y * self.stride + x) as usize]
    }

    fn set(&mut self, x: i32, y: i32, value: i32) {
        self.cells[(y * self.stride + x) as usize] = value;
    }
}

/// Outermost boundaries of the non-zero regions of a binary edge map.
///
/// Borders nested inside another region's hole are discarded. Contours come
/// back in raster order of their first pixel, with collinear runs
/// compressed to their endpoints.
pub fn find_external_contours(edges: &GrayImage) -> Vec<Contour> {
    let (width, height) = edges.dimensions();
    let mut grid = LabelGrid::from_edges(edges);

    // index 0 unused, index 1 is the frame
    let mut borders = vec![
        Border {
            kind: BorderKind::Hole,
            parent: 0,
        },
        Border {
            kind: BorderKind::Hole,
            parent: 0,
        },
    ];
    let mut contours = Vec::new();
    let mut nbd = FRAME;

    for y in 1..=height as i32 {
        let mut lnbd = FRAME;

        for x in 1..=width as i32 {
            let value = grid.get(x, y);
            if value == 0 {
                continue;
            }

            let start = if value == 1 && grid.get(x - 1, y) == 0 {
                Some((BorderKind::Outer, (x - 1, y)))
            } else if value >= 1 && grid.get(x + 1, y) == 0 {
                if value > 1 {
                    lnbd = value;
                }
                Some((BorderKind::Hole, (x + 1, y)))
            } else {
                None
            };

            if let Some((kind, from)) = start {
                nbd += 1;
                let last = borders[lnbd as usize];
                let parent = match (kind, last.kind) {
                    (BorderKind::Outer, BorderKind::Outer) => last.parent,
                    (BorderKind::Outer, BorderKind::Hole) => lnbd,
                    (BorderKind::Hole, BorderKind::Outer) => lnbd,
                    (BorderKind::Hole, BorderKind::Hole) => last.parent,
                };
                borders.push(Border { kind, parent });

                let points = follow_border(&mut grid, (x, y), from, nbd);
                if kind == BorderKind::Outer && parent == FRAME {
                    contours.push(Contour::new(simplify_chain(&points)));
                }
            }

            let value = grid.get(x, y);
            if value != 0 && value != 1 {
                lnbd = value.abs();
            }
        }
    }

    contours
}

/// Trace one border starting at `start`, entered from the zero pixel `from`.
/// Returns the visited pixels in image coordinates.
fn follow_border(grid: &mut LabelGrid, start: (i32, i32), from: (i32, i32), nbd: i32) -> Vec<Point<i32>> {
    let to_image = |(x, y): (i32, i32)| Point::new(x - 1, y - 1);
    let step = |(x, y): (i32, i32), d: usize| (x + DIRECTIONS[d].0, y + DIRECTIONS[d].1);

    // clockwise search for the first non-zero neighbour
    let from_dir = direction(start, from);
    let first = (0..8)
        .map(|k| (from_dir + 8 - k) % 8)
        .find(|&d| {
            let (nx, ny) = step(start, d);
            grid.get(nx, ny) != 0
        });

    let Some(first_dir) = first else {
        grid.set(start.0, start.1, -nbd);
        return vec![to_image(start)];
    };

    let p1 = step(start, first_dir);
    let mut p2 = p1;
    let mut p3 = start;
    let mut points = Vec::new();

    loop {
        // counter-clockwise search around p3, beginning just after p2
        let back = direction(p3, p2);
        let mut east_is_background = false;
        let mut p4 = p2;
        for k in 1..=8 {
            let d = (back + k) % 8;
            let candidate = step(p3, d);
            if grid.get(candidate.0, candidate.1) != 0 {
                p4 = candidate;
                break;
            }
            if d == 0 {
                east_is_background = true;
            }
        }

        if east_is_background {
            grid.set(p3.0, p3.1, -nbd);
        } else if grid.get(p3.0, p3.1) == 1 {
            grid.set(p3.0, p3.1, nbd);
        }
        points.push(to_image(p3));

        if p4 == start && p3 == p1 {
            break;
        }
        p2 = p3;
        p3 = p4;
    }

    points
}

fn direction(from: (i32, i32), to: (i32, i32)) -> usize {
    let delta = (to.0 - from.0, to.1 - from.1);
    DIRECTIONS
        .iter()
        .position(|&d| d == delta)
        .unwrap_or(0)
}

/// Drop every point that continues the previous step's direction, leaving
/// only the endpoints of horizontal, vertical and diagonal runs.
pub fn simplify_chain(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            (cur.x - prev.x, cur.y - prev.y) != (next.x - cur.x, next.y - cur.y)
        })
        .map(|i| points[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoundingRect;
    use image::Luma;

    fn fill(img: &mut GrayImage, x0: u32, y0: u32, w: u32, h: u32) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
    }

    fn outline(img: &mut GrayImage, x0: u32, y0: u32, w: u32, h: u32) {
        for x in x0..x0 + w {
            img.put_pixel(x, y0, Luma([255u8]));
            img.put_pixel(x, y0 + h - 1, Luma([255u8]));
        }
        for y in y0..y0 + h {
            img.put_pixel(x0, y, Luma([255u8]));
            img.put_pixel(x0 + w - 1, y, Luma([255u8]));
        }
    }

    #[test]
    fn empty_map_has_no_contours() {
        assert!(find_external_contours(&GrayImage::new(16, 16)).is_empty());
    }

    #[test]
    fn filled_block_compresses_to_corners() {
        let mut img = GrayImage::new(10, 10);
        fill(&mut img, 2, 3, 4, 5);

        let contours = find_external_contours(&img);
        assert_eq!(contours.len(), 1);

        let mut corners = contours[0].points.clone();
        corners.sort_by_key(|p| (p.y, p.x));
        assert_eq!(
            corners,
            vec![
                Point::new(2, 3),
                Point::new(5, 3),
                Point::new(2, 7),
                Point::new(5, 7),
            ]
        );
        assert_eq!(contours[0].bounding_rect(), BoundingRect::new(2, 3, 4, 5));
    }

    #[test]
    fn ring_yields_only_its_outer_border() {
        let mut img = GrayImage::new(20, 20);
        outline(&mut img, 3, 4, 12, 10);

        let contours = find_external_contours(&img);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].bounding_rect(), BoundingRect::new(3, 4, 12, 10));
    }

    #[test]
    fn region_inside_a_hole_is_discarded() {
        let mut img = GrayImage::new(30, 30);
        outline(&mut img, 2, 2, 24, 24);
        fill(&mut img, 10, 10, 5, 5);

        let contours = find_external_contours(&img);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].bounding_rect(), BoundingRect::new(2, 2, 24, 24));
    }

    #[test]
    fn separate_regions_come_back_in_raster_order() {
        let mut img = GrayImage::new(40, 30);
        fill(&mut img, 25, 2, 5, 5);
        fill(&mut img, 3, 4, 6, 6);
        fill(&mut img, 12, 20, 3, 3);

        let rects: Vec<BoundingRect> = find_external_contours(&img)
            .iter()
            .map(Contour::bounding_rect)
            .collect();
        assert_eq!(
            rects,
            vec![
                BoundingRect::new(25, 2, 5, 5),
                BoundingRect::new(3, 4, 6, 6),
                BoundingRect::new(12, 20, 3, 3),
            ]
        );
    }

    #[test]
    fn isolated_pixel_and_thin_line() {
        let mut img = GrayImage::new(12, 12);
        img.put_pixel(1, 1, Luma([255u8]));
        fill(&mut img, 4, 6, 6, 1);

        let contours = find_external_contours(&img);
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[0].points, vec![Point::new(1, 1)]);
        assert_eq!(contours[1].bounding_rect(), BoundingRect::new(4, 6, 6, 1));
        assert_eq!(contours[1].points.len(), 2);
    }

    #[test]
    fn diagonal_touch_joins_regions() {
        let mut img = GrayImage::new(12, 12);
        fill(&mut img, 1, 1, 3, 3);
        fill(&mut img, 4, 4, 3, 3);

        let contours = find_external_contours(&img);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].bounding_rect(), BoundingRect::new(1, 1, 6, 6));
    }

    #[test]
    fn regions_touching_the_image_border() {
        let mut img = GrayImage::new(8, 8);
        fill(&mut img, 0, 0, 8, 3);

        let contours = find_external_contours(&img);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].bounding_rect(), BoundingRect::new(0, 0, 8, 3));
    }

    #[test]
    fn simplify_keeps_direction_changes() {
        let square: Vec<Point<i32>> = vec![
            Point::new(0, 0),
            Point::new(1, 0),
            Point::new(2, 0),
            Point::new(2, 1),
            Point::new(2, 2),
            Point::new(1, 2),
            Point::new(0, 2),
            Point::new(0, 1),
        ];
        assert_eq!(
            simplify_chain(&square),
            vec![
                Point::new(0, 0),
                Point::new(2, 0),
                Point::new(2, 2),
                Point::new(0, 2),
            ]
        );

        let pair = vec![Point::new(0, 0), Point::new(1, 0)];
        assert_eq!(simplify_chain(&pair), pair);
    }
}
