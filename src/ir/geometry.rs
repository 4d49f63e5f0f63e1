//! Geometry kernel: rotation, centroids, convex perimeters and hit testing.
//!
//! Everything here is a pure function over canvas points. The rotation
//! convention is the one used by every annotation file written so far, so it
//! must not be "fixed" into a textbook rotation matrix.

use std::cmp::Ordering;

use super::bbox::BBoxXYXY;
use super::coord::Point;
use super::Pixel;

/// Rotates `point` about `center` by `angle_degrees`.
///
/// Uses `nx = cos·dx + sin·dy + cx`, `ny = cos·dy − sin·dx + cy`, which turns
/// clockwise on a y-down canvas for positive angles. Rotating by `-angle`
/// undoes rotating by `angle`.
pub fn rotate_point(center: Point, point: Point, angle_degrees: f64) -> Point {
    let radians = angle_degrees * std::f64::consts::PI / 180.0;
    let (sin, cos) = radians.sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Point::new(cos * dx + sin * dy + center.x, cos * dy - sin * dx + center.y)
}

/// Per-axis arithmetic mean. An empty slice yields the origin.
pub fn centroid(points: &[Point]) -> Point {
    let count = points.len().max(1) as f64;
    let (sum_x, sum_y) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point::new(sum_x / count, sum_y / count)
}

/// Index of the first point within `epsilon` of `query`, scanning in storage
/// order. Ties go to the lower index.
pub fn nearest_vertex(points: &[Point], query: Point, epsilon: f64) -> Option<usize> {
    points
        .iter()
        .position(|point| point.distance_to(&query) <= epsilon)
}

/// The closed outline used for hit testing and filling a shape.
#[derive(Clone, Debug, PartialEq)]
pub struct Perimeter {
    /// Outline vertices in traversal order; the last connects back to the first.
    pub points: Vec<Point>,
    /// Set when no proper hull exists (fewer than three distinct points, or all
    /// collinear). `points` is then the input in its original order.
    pub degenerate: bool,
}

impl Perimeter {
    /// Even-odd point-in-polygon test against the outline.
    pub fn contains(&self, point: Point) -> bool {
        point_in_polygon(&self.points, point)
    }

    /// Axis-aligned extent of the outline, `None` when it has no points.
    pub fn bounding_rect(&self) -> Option<BBoxXYXY<Pixel>> {
        let first = self.points.first()?;
        let init = BBoxXYXY::new(*first, *first);
        Some(self.points.iter().fold(init, |acc, p| {
            BBoxXYXY::from_xyxy(
                acc.xmin().min(p.x),
                acc.ymin().min(p.y),
                acc.xmax().max(p.x),
                acc.ymax().max(p.y),
            )
        }))
    }
}

/// Convex hull of `points` in hull traversal order.
///
/// Graham scan from the lowest (then leftmost) point. Collinear points on an
/// edge are dropped. Degenerate input is returned unchanged with
/// [`Perimeter::degenerate`] set.
pub fn convex_perimeter(points: &[Point]) -> Perimeter {
    let mut distinct: Vec<Point> = Vec::with_capacity(points.len());
    for point in points {
        if !distinct.contains(point) {
            distinct.push(*point);
        }
    }

    if distinct.len() < 3 {
        return degenerate(points);
    }

    let start_idx = distinct
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.y.total_cmp(&b.y).then_with(|| a.x.total_cmp(&b.x)))
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    distinct.swap(0, start_idx);
    let start = distinct[0];

    distinct[1..].sort_by(|a, b| {
        let cross = cross_product(&start, a, b);
        if cross > 0.0 {
            Ordering::Less
        } else if cross < 0.0 {
            Ordering::Greater
        } else {
            start.distance_to(a).total_cmp(&start.distance_to(b))
        }
    });

    let mut hull: Vec<Point> = Vec::with_capacity(distinct.len());
    for point in distinct {
        while hull.len() > 1
            && cross_product(&hull[hull.len() - 2], &hull[hull.len() - 1], &point) <= 0.0
        {
            hull.pop();
        }
        hull.push(point);
    }

    if hull.len() < 3 {
        return degenerate(points);
    }

    Perimeter {
        points: hull,
        degenerate: false,
    }
}

fn degenerate(points: &[Point]) -> Perimeter {
    log::debug!(
        "convex perimeter of {} point(s) is degenerate; keeping input order",
        points.len()
    );
    Perimeter {
        points: points.to_vec(),
        degenerate: true,
    }
}

/// Point-in-polygon over the convex perimeter of `points`, not their raw order.
pub fn contains_point(points: &[Point], point: Point) -> bool {
    convex_perimeter(points).contains(point)
}

// Positive for a counter-clockwise turn p1 -> p2 -> p3 (in y-up terms).
fn cross_product(p1: &Point, p2: &Point, p3: &Point) -> f64 {
    (p2.x - p1.x) * (p3.y - p1.y) - (p2.y - p1.y) * (p3.x - p1.x)
}

fn point_in_polygon(polygon: &[Point], point: Point) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
