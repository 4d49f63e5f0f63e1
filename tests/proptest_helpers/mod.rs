#![allow(dead_code)]

use rotolabel::ir::{
    rotate_point, AnnotationDocument, BBoxXYXY, ImageSize, Pixel, Point, Shape, ShapeKind,
};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

/// Image every generated document claims to annotate.
pub const IMAGE_SIZE: u32 = 2000;

/// Tetragons round, octagons truncate, and rotated boxes are rounded once on
/// each side of the rotation: at most one unit per coordinate.
pub const EPS_POINTS: f64 = 1.0;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Labels that need XML escaping and may carry surrounding spaces, but are
/// never blank.
pub fn arb_label() -> BoxedStrategy<String> {
    " {0,2}[a-zA-Z&<>][a-zA-Z0-9_&<>' -]{0,10} {0,2}".boxed()
}

/// Axis-aligned or rotated rectangle with an integer canonical box kept well
/// away from the image origin, so rotated corners never hit the clamp.
pub fn arb_rectangle() -> BoxedStrategy<Shape> {
    (
        arb_label(),
        300u32..600,
        300u32..600,
        2u32..200,
        2u32..200,
        prop_oneof![Just(0i32), 0i32..360],
        any::<bool>(),
    )
        .prop_map(|(label, xmin, ymin, w, h, angle, difficult)| {
            let canonical = BBoxXYXY::<Pixel>::from_xyxy(
                f64::from(xmin),
                f64::from(ymin),
                f64::from(xmin + w),
                f64::from(ymin + h),
            );
            let center = canonical.center();
            let corners: Vec<Point> = canonical
                .corners()
                .into_iter()
                .map(|p| rotate_point(center, p, f64::from(angle)))
                .collect();
            Shape::new(ShapeKind::Box)
                .with_label(label)
                .with_points(corners)
                .with_angle(angle)
                .with_difficult(difficult)
        })
        .boxed()
}

fn arb_point() -> impl Strategy<Value = Point> {
    (0.0..1000.0f64, 0.0..1000.0f64).prop_map(|(x, y)| Point::new(x, y))
}

/// Free shape with any number of points its kind needs and any angle,
/// including out-of-range ones.
pub fn arb_free_shape() -> BoxedStrategy<Shape> {
    (
        arb_label(),
        prop_oneof![Just(ShapeKind::Tetragon), Just(ShapeKind::Octagon3D)],
        prop::collection::vec(arb_point(), 8),
        -720i32..720,
        any::<bool>(),
    )
        .prop_map(|(label, kind, mut points, angle, difficult)| {
            points.truncate(kind.point_count());
            Shape::new(kind)
                .with_label(label)
                .with_points(points)
                .with_angle(angle)
                .with_difficult(difficult)
        })
        .boxed()
}

pub fn arb_shape() -> BoxedStrategy<Shape> {
    prop_oneof![arb_rectangle(), arb_free_shape()].boxed()
}

pub fn arb_document(max_shapes: usize) -> BoxedStrategy<AnnotationDocument> {
    (
        prop::collection::vec(arb_shape(), 0..=max_shapes),
        any::<bool>(),
        prop::option::of("[a-z/]{1,20}[a-z]"),
    )
        .prop_map(|(shapes, verified, path)| {
            let mut doc = AnnotationDocument::new(
                "images",
                "frame.jpg",
                ImageSize::new(IMAGE_SIZE, IMAGE_SIZE).with_depth(3),
            )
            .with_verified(verified)
            .with_shapes(shapes);
            doc.path = path;
            doc
        })
        .boxed()
}

/// Compare two shape lists the way a saved-and-reopened document should
/// match: persistent fields exactly, points within the kind's tolerance.
pub fn assert_shapes_equivalent(before: &[Shape], after: &[Shape]) -> Result<(), String> {
    if before.len() != after.len() {
        return Err(format!(
            "shape count changed: {} -> {}",
            before.len(),
            after.len()
        ));
    }

    for (index, (a, b)) in before.iter().zip(after).enumerate() {
        if a.label() != b.label() {
            return Err(format!(
                "shape {index}: label {:?} -> {:?}",
                a.label(),
                b.label()
            ));
        }
        if a.kind() != b.kind() {
            return Err(format!("shape {index}: kind {:?} -> {:?}", a.kind(), b.kind()));
        }
        if a.angle() != b.angle() {
            return Err(format!("shape {index}: angle {} -> {}", a.angle(), b.angle()));
        }
        if a.difficult() != b.difficult() {
            return Err(format!("shape {index}: difficult flag changed"));
        }
        if a.len() != b.len() {
            return Err(format!("shape {index}: {} -> {} points", a.len(), b.len()));
        }

        let eps = EPS_POINTS;
        for (i, (p, q)) in a.points().iter().zip(b.points()).enumerate() {
            if (p.x - q.x).abs() > eps || (p.y - q.y).abs() > eps {
                return Err(format!(
                    "shape {index} point {i}: {p:?} -> {q:?} (eps {eps})"
                ));
            }
        }
    }

    Ok(())
}
