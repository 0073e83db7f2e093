mod common;

use common::*;
use image::{DynamicImage, Rgb};

#[test]
fn counts_five_squares() -> anyhow::Result<()> {
    let result = detect_boxes(&five_squares(), ClassificationThresholds::default())?;

    assert_eq!(result.count, 5);
    assert_eq!(result.boxes.len(), 5);
    for origin in SQUARE_ORIGINS {
        assert!(
            result
                .boxes
                .iter()
                .any(|b| approximates(b, origin, SQUARE_SIDE, 2)),
            "no box near square at {origin:?}: {:?}",
            result.boxes
        );
    }

    Ok(())
}

#[test]
fn boxes_come_back_in_raster_order() -> anyhow::Result<()> {
    let result = detect_boxes(&five_squares(), ClassificationThresholds::default())?;

    let keys: Vec<(u32, u32)> = result.boxes.iter().map(|b| (b.y, b.x)).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);

    Ok(())
}

#[test]
fn dark_squares_on_light_background() -> anyhow::Result<()> {
    let mut img = canvas(300, 200, WHITE);
    for (x, y) in SQUARE_ORIGINS {
        fill_rect(&mut img, x, y, SQUARE_SIDE, SQUARE_SIDE, BLACK);
    }

    let result = detect_boxes(&DynamicImage::ImageRgb8(img), ClassificationThresholds::default())?;
    assert_eq!(result.count, 5);

    Ok(())
}

#[test]
fn long_thin_rect_is_not_counted() -> anyhow::Result<()> {
    let result = detect_boxes(&single_rect(10, 200), ClassificationThresholds::default())?;

    assert_eq!(result.count, 0);
    assert!(result.boxes.is_empty());

    Ok(())
}

#[test]
fn too_small_and_too_large_squares_are_not_counted() -> anyhow::Result<()> {
    let t = ClassificationThresholds::default();

    assert_eq!(detect_boxes(&single_rect(20, 20), t)?.count, 0);
    assert_eq!(detect_boxes(&single_rect(150, 150), t)?.count, 0);
    assert_eq!(detect_boxes(&single_rect(100, 100), t)?.count, 1);

    Ok(())
}

#[test]
fn blank_image_counts_zero() -> anyhow::Result<()> {
    let img = DynamicImage::ImageRgb8(canvas(200, 150, Rgb([120, 120, 120])));
    let result = detect_boxes(&img, ClassificationThresholds::default())?;

    assert_eq!(result.count, 0);
    assert!(result.boxes.is_empty());
    assert_eq!(result.annotated, img.to_rgba8());

    Ok(())
}

#[test]
fn zero_sized_image_is_an_error() {
    let img = DynamicImage::ImageRgb8(canvas(0, 50, BLACK));
    let err = detect_boxes(&img, ClassificationThresholds::default()).unwrap_err();
    assert!(matches!(err, DetectError::InvalidImage { .. }));
}

#[test]
fn repeated_runs_are_identical() -> anyhow::Result<()> {
    let counter = BoxCounter::new(DetectorConfig::default())?;
    let img = five_squares();

    let first = counter.count(&img)?;
    let second = counter.count(&img)?;

    assert_eq!(first.count, second.count);
    assert_eq!(first.boxes, second.boxes);
    assert_eq!(first.annotated, second.annotated);

    Ok(())
}

#[test]
fn detected_area_on_the_bound_is_rejected() -> anyhow::Result<()> {
    let img = single_rect(40, 40);
    let found = detect_boxes(&img, ClassificationThresholds::default())?;
    assert_eq!(found.count, 1);
    let area = found.boxes[0].area();

    let at_bound = ClassificationThresholds {
        area_min: area,
        ..Default::default()
    };
    assert_eq!(detect_boxes(&img, at_bound)?.count, 0);

    let below_bound = ClassificationThresholds {
        area_min: area - 1,
        ..Default::default()
    };
    assert_eq!(detect_boxes(&img, below_bound)?.count, 1);

    let at_upper = ClassificationThresholds {
        area_max: area,
        area_min: 10,
        ..Default::default()
    };
    assert_eq!(detect_boxes(&img, at_upper)?.count, 0);

    Ok(())
}

#[test]
fn debug_views_agree_with_count() -> anyhow::Result<()> {
    let counter = BoxCounter::new(DetectorConfig::default())?;
    let img = five_squares();

    let edges = counter.edge_map(&img)?;
    assert_eq!(edges.dimensions(), (300, 200));
    assert!(edges.pixels().any(|p| p[0] == 255));

    let contours = counter.contours(&img)?;
    assert_eq!(contours.len(), 5);

    Ok(())
}
