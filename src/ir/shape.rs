//! The shape model: one annotation on one image.
//!
//! A shape is an ordered list of canvas points plus a label, a rotation angle
//! and a difficulty flag. Which of the four kinds it is decides how many points
//! it carries and how the codecs persist it:
//!
//! | kind | points | persisted as |
//! |---|---|---|
//! | [`ShapeKind::Box`] | 4 corners | canonical `xmin..ymax` |
//! | [`ShapeKind::RotatedBox`] | 4 rotated corners | canonical `xmin..ymax` + angle |
//! | [`ShapeKind::Tetragon`] | 4 free points | `k0x..k3y` |
//! | [`ShapeKind::Octagon3D`] | 8 cuboid vertices | `k0x..k7y` |
//!
//! Box and rotated box are one rectangle family; only a non-zero angle tells
//! them apart, so changing the angle moves a rectangle between the two kinds.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use super::bbox::BBoxXYXY;
use super::coord::Point;
use super::geometry::{self, Perimeter};
use super::style::{PointType, ShapeStyle};
use super::Pixel;

/// Distance of the rotation handle above the shape's top edge, before the
/// shape's own rotation is applied.
pub const ROTATION_HANDLE_OFFSET: f64 = 50.0;

/// The four structurally different annotation kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Box,
    RotatedBox,
    Tetragon,
    #[serde(rename = "octagon_3d")]
    Octagon3D,
}

impl ShapeKind {
    /// Number of points a finished shape of this kind has.
    pub fn point_count(self) -> usize {
        match self {
            ShapeKind::Box | ShapeKind::RotatedBox | ShapeKind::Tetragon => 4,
            ShapeKind::Octagon3D => 8,
        }
    }

    /// True for [`ShapeKind::Box`] and [`ShapeKind::RotatedBox`].
    pub fn is_rectangle(self) -> bool {
        matches!(self, ShapeKind::Box | ShapeKind::RotatedBox)
    }
}

// What is actually stored; the public kind is derived from this plus the angle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Family {
    Rectangle,
    Tetragon,
    Octagon3D,
}

impl From<ShapeKind> for Family {
    fn from(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Box | ShapeKind::RotatedBox => Family::Rectangle,
            ShapeKind::Tetragon => Family::Tetragon,
            ShapeKind::Octagon3D => Family::Octagon3D,
        }
    }
}

/// How a highlighted vertex is being interacted with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HighlightMode {
    /// The vertex is being dragged.
    MoveVertex,
    /// The cursor hovers close to the vertex.
    NearVertex,
}

impl HighlightMode {
    fn marker(self) -> (f64, PointType) {
        match self {
            HighlightMode::NearVertex => (4.0, PointType::Round),
            HighlightMode::MoveVertex => (1.5, PointType::Square),
        }
    }
}

/// Maps any integer angle into `[0, 360)`.
pub fn normalize_angle(degrees: i32) -> i32 {
    degrees.rem_euclid(360)
}

/// One annotation shape.
///
/// Only the label, points, kind, angle and difficulty are persistent. Closing
/// state, selection, fill, highlight and style belong to the editing session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "ShapeRecord", into = "ShapeRecord")]
pub struct Shape {
    label: Option<String>,
    points: Vec<Point>,
    family: Family,
    angle: i32,
    difficult: bool,
    closed: bool,
    /// Paint the interior.
    pub fill: bool,
    /// Currently selected on the canvas.
    pub selected: bool,
    highlight: Option<(usize, HighlightMode)>,
    /// Colors and sizes for painting.
    pub style: ShapeStyle,
}

impl Shape {
    /// Starts an empty, unlabeled shape of the given kind with the default style.
    ///
    /// Creating a [`ShapeKind::RotatedBox`] only picks the rectangle family; it
    /// reports as a rotated box once a non-zero angle is set.
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            label: None,
            points: Vec::new(),
            family: kind.into(),
            angle: 0,
            difficult: false,
            closed: false,
            fill: false,
            selected: false,
            highlight: None,
            style: ShapeStyle::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_points(mut self, points: impl IntoIterator<Item = Point>) -> Self {
        self.points = points.into_iter().collect();
        self
    }

    pub fn with_angle(mut self, degrees: i32) -> Self {
        self.set_angle(degrees);
        self
    }

    pub fn with_difficult(mut self, difficult: bool) -> Self {
        self.difficult = difficult;
        self
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn kind(&self) -> ShapeKind {
        match self.family {
            Family::Rectangle if self.angle == 0 => ShapeKind::Box,
            Family::Rectangle => ShapeKind::RotatedBox,
            Family::Tetragon => ShapeKind::Tetragon,
            Family::Octagon3D => ShapeKind::Octagon3D,
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn set_points(&mut self, points: Vec<Point>) {
        self.points = points;
    }

    /// Rotation in whole degrees, always within `[0, 360)`.
    pub fn angle(&self) -> i32 {
        self.angle
    }

    pub fn set_angle(&mut self, degrees: i32) {
        self.angle = normalize_angle(degrees);
    }

    pub fn difficult(&self) -> bool {
        self.difficult
    }

    pub fn set_difficult(&mut self, difficult: bool) {
        self.difficult = difficult;
    }

    pub fn toggle_difficult(&mut self) {
        self.difficult = !self.difficult;
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True once the shape holds exactly as many points as its kind requires.
    pub fn is_complete(&self) -> bool {
        self.points.len() == self.kind().point_count()
    }

    /// Appends a point while drawing. Clicking the first point again closes
    /// the outline instead of adding a duplicate.
    pub fn add_point(&mut self, point: Point) {
        if self.points.first() == Some(&point) {
            self.close();
        } else {
            self.points.push(point);
        }
    }

    pub fn pop_point(&mut self) -> Option<Point> {
        self.points.pop()
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn set_open(&mut self) {
        self.closed = false;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether drawing should stop accepting points: four for rectangles and
    /// tetragons, eight for 3D octagons.
    pub fn reach_max_points(&self) -> bool {
        self.points.len() >= self.kind().point_count()
    }

    pub fn move_by(&mut self, offset: Point) {
        for point in &mut self.points {
            *point = *point + offset;
        }
    }

    /// Moves one vertex. Out-of-range indices are ignored.
    pub fn move_vertex_by(&mut self, index: usize, offset: Point) {
        if let Some(point) = self.points.get_mut(index) {
            *point = *point + offset;
        }
    }

    pub fn highlight_vertex(&mut self, index: usize, mode: HighlightMode) {
        self.highlight = Some((index, mode));
    }

    pub fn highlight_clear(&mut self) {
        self.highlight = None;
    }

    pub fn highlighted(&self) -> Option<(usize, HighlightMode)> {
        self.highlight
    }

    /// Marker diameter and glyph for vertex `index`, honoring the highlight.
    pub fn vertex_marker(&self, index: usize) -> (f64, PointType) {
        let diameter = self.style.vertex_diameter();
        match self.highlight {
            Some((highlighted, mode)) if highlighted == index => {
                let (factor, point_type) = mode.marker();
                (diameter * factor, point_type)
            }
            _ => (diameter, self.style.point_type),
        }
    }

    /// Centroid of the points rounded to whole pixels; the rotation pivot.
    pub fn center_point(&self) -> Point {
        geometry::centroid(&self.points).round()
    }

    /// Position of the draggable rotation control.
    ///
    /// The handle sits [`ROTATION_HANDLE_OFFSET`] units above the top of the
    /// un-rotated shape, then follows the shape's rotation. `None` for an
    /// empty shape.
    pub fn rotation_handle(&self) -> Option<Point> {
        if self.points.is_empty() {
            return None;
        }
        let center = self.center_point();
        let angle = f64::from(self.angle);
        let top = self
            .points
            .iter()
            .map(|p| geometry::rotate_point(center, *p, -angle).y)
            .fold(f64::INFINITY, f64::min);
        let upright = Point::new(center.x, top - ROTATION_HANDLE_OFFSET);
        Some(geometry::rotate_point(center, upright, angle))
    }

    pub fn over_rotation_handle(&self, point: Point, epsilon: f64) -> bool {
        self.rotation_handle()
            .is_some_and(|handle| handle.distance_to(&point) <= epsilon)
    }

    pub fn nearest_vertex(&self, point: Point, epsilon: f64) -> Option<usize> {
        geometry::nearest_vertex(&self.points, point, epsilon)
    }

    /// Convex outline of the points, safe to fill even when the raw order
    /// self-intersects (3D octagons).
    pub fn perimeter(&self) -> Perimeter {
        geometry::convex_perimeter(&self.points)
    }

    pub fn contains_point(&self, point: Point) -> bool {
        self.perimeter().contains(point)
    }

    pub fn bounding_rect(&self) -> Option<BBoxXYXY<Pixel>> {
        self.perimeter().bounding_rect()
    }

    /// The un-rotated box of a rectangle, taken from its first and third
    /// points. Rotated boxes are turned back by `-angle` about the diagonal's
    /// midpoint. `None` for other kinds or an unfinished rectangle.
    pub fn canonical_box(&self) -> Option<BBoxXYXY<Pixel>> {
        if self.family != Family::Rectangle {
            return None;
        }
        let (first, third) = (*self.points.first()?, *self.points.get(2)?);
        let bbox = BBoxXYXY::new(first, third);
        if self.angle == 0 {
            return Some(bbox);
        }
        let center = bbox.center();
        let angle = -f64::from(self.angle);
        Some(BBoxXYXY::new(
            geometry::rotate_point(center, first, angle),
            geometry::rotate_point(center, third, angle),
        ))
    }

    /// Copy for paste/duplicate: same label, points, kind, angle, flags and
    /// style, with selection and highlight cleared.
    pub fn duplicate(&self) -> Shape {
        Shape {
            selected: false,
            highlight: None,
            ..self.clone()
        }
    }
}

impl Index<usize> for Shape {
    type Output = Point;

    fn index(&self, index: usize) -> &Point {
        &self.points[index]
    }
}

impl IndexMut<usize> for Shape {
    fn index_mut(&mut self, index: usize) -> &mut Point {
        &mut self.points[index]
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct ShapeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    kind: ShapeKind,
    #[serde(default)]
    angle: i32,
    #[serde(default)]
    difficult: bool,
    points: Vec<Point>,
}

impl From<ShapeRecord> for Shape {
    fn from(record: ShapeRecord) -> Self {
        let mut shape = Shape::new(record.kind)
            .with_points(record.points)
            .with_angle(record.angle)
            .with_difficult(record.difficult);
        shape.label = record.label;
        shape
    }
}

impl From<Shape> for ShapeRecord {
    fn from(shape: Shape) -> Self {
        ShapeRecord {
            kind: shape.kind(),
            label: shape.label,
            angle: shape.angle,
            difficult: shape.difficult,
            points: shape.points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(size, 0.0),
            Point::new(size, size),
            Point::new(0.0, size),
        ]
    }

    #[test]
    fn angle_moves_rectangle_between_kinds() {
        let mut shape = Shape::new(ShapeKind::Box).with_points(square(10.0));
        assert_eq!(shape.kind(), ShapeKind::Box);

        shape.set_angle(30);
        assert_eq!(shape.kind(), ShapeKind::RotatedBox);

        shape.set_angle(360);
        assert_eq!(shape.angle(), 0);
        assert_eq!(shape.kind(), ShapeKind::Box);
    }

    #[test]
    fn angle_does_not_change_other_kinds() {
        let shape = Shape::new(ShapeKind::Tetragon).with_angle(45);
        assert_eq!(shape.kind(), ShapeKind::Tetragon);
        assert_eq!(shape.angle(), 45);
    }

    #[test]
    fn negative_angles_wrap_into_range() {
        assert_eq!(normalize_angle(-30), 330);
        assert_eq!(normalize_angle(720), 0);
        assert_eq!(normalize_angle(359), 359);
    }

    #[test]
    fn clicking_first_point_closes_instead_of_appending() {
        let mut shape = Shape::new(ShapeKind::Tetragon);
        shape.add_point(Point::new(1.0, 1.0));
        shape.add_point(Point::new(5.0, 1.0));
        assert!(!shape.is_closed());

        shape.add_point(Point::new(1.0, 1.0));
        assert!(shape.is_closed());
        assert_eq!(shape.len(), 2);

        shape.set_open();
        assert!(!shape.is_closed());
        assert_eq!(shape.pop_point(), Some(Point::new(5.0, 1.0)));
    }

    #[test]
    fn max_points_depends_on_kind() {
        let four = square(4.0);
        assert!(Shape::new(ShapeKind::Box).with_points(four.clone()).reach_max_points());
        assert!(Shape::new(ShapeKind::Tetragon)
            .with_points(four.clone())
            .reach_max_points());
        assert!(!Shape::new(ShapeKind::Octagon3D)
            .with_points(four)
            .reach_max_points());
    }

    #[test]
    fn duplicate_resets_transient_state_only() {
        let mut shape = Shape::new(ShapeKind::Box)
            .with_label("car")
            .with_points(square(8.0))
            .with_angle(15)
            .with_difficult(true);
        shape.selected = true;
        shape.fill = true;
        shape.highlight_vertex(2, HighlightMode::MoveVertex);

        let copy = shape.duplicate();
        assert_eq!(copy.label(), Some("car"));
        assert_eq!(copy.points(), shape.points());
        assert_eq!(copy.kind(), ShapeKind::RotatedBox);
        assert!(copy.difficult());
        assert!(copy.fill);
        assert!(!copy.selected);
        assert_eq!(copy.highlighted(), None);

        // Deep copy: moving the original leaves the copy in place.
        shape.move_by(Point::new(1.0, 1.0));
        assert_eq!(copy[0], Point::new(0.0, 0.0));
    }

    #[test]
    fn rotation_handle_sits_above_unrotated_shape() {
        let shape = Shape::new(ShapeKind::Box).with_points(square(10.0));
        assert_eq!(shape.rotation_handle(), Some(Point::new(5.0, -50.0)));
        assert!(shape.over_rotation_handle(Point::new(6.0, -50.0), 2.0));
    }

    #[test]
    fn rotation_handle_follows_rotation() {
        let center = Point::new(5.0, 5.0);
        let rotated: Vec<Point> = square(10.0)
            .into_iter()
            .map(|p| geometry::rotate_point(center, p, 90.0))
            .collect();
        let shape = Shape::new(ShapeKind::Box)
            .with_points(rotated)
            .with_angle(90);

        let handle = shape.rotation_handle().expect("non-empty shape");
        let expected = geometry::rotate_point(center, Point::new(5.0, -50.0), 90.0);
        assert!(handle.distance_to(&expected) < 1e-6);
    }

    #[test]
    fn empty_shape_has_no_handle() {
        assert_eq!(Shape::new(ShapeKind::Box).rotation_handle(), None);
    }

    #[test]
    fn canonical_box_reverses_rotation() {
        let canonical = BBoxXYXY::<Pixel>::from_xyxy(10.0, 20.0, 50.0, 40.0);
        let center = canonical.center();
        let rotated: Vec<Point> = canonical
            .corners()
            .into_iter()
            .map(|p| geometry::rotate_point(center, p, 30.0))
            .collect();
        let shape = Shape::new(ShapeKind::Box)
            .with_points(rotated)
            .with_angle(30);

        let recovered = shape.canonical_box().expect("rectangle");
        assert!(recovered.min.distance_to(&canonical.min) < 1e-9);
        assert!(recovered.max.distance_to(&canonical.max) < 1e-9);
    }

    #[test]
    fn canonical_box_is_none_for_free_shapes() {
        let shape = Shape::new(ShapeKind::Tetragon).with_points(square(3.0));
        assert!(shape.canonical_box().is_none());
    }

    #[test]
    fn highlight_changes_vertex_marker() {
        let mut shape = Shape::new(ShapeKind::Tetragon).with_points(square(3.0));
        assert_eq!(shape.vertex_marker(1), (6.0, PointType::Round));

        shape.highlight_vertex(1, HighlightMode::MoveVertex);
        assert_eq!(shape.vertex_marker(1), (9.0, PointType::Square));
        assert_eq!(shape.vertex_marker(0), (6.0, PointType::Round));

        shape.highlight_clear();
        assert_eq!(shape.vertex_marker(1), (6.0, PointType::Round));
    }

    #[test]
    fn move_vertex_ignores_bad_index() {
        let mut shape = Shape::new(ShapeKind::Tetragon).with_points(square(3.0));
        shape.move_vertex_by(1, Point::new(1.0, 2.0));
        shape.move_vertex_by(9, Point::new(1.0, 2.0));
        assert_eq!(shape[1], Point::new(4.0, 2.0));
    }

    #[test]
    fn vertex_assignment_by_index() {
        let mut shape = Shape::new(ShapeKind::Tetragon).with_points(square(3.0));
        shape[2] = Point::new(5.0, 6.0);
        assert_eq!(shape.points()[2], Point::new(5.0, 6.0));
        assert_eq!(shape[3], Point::new(0.0, 3.0));
    }

    #[test]
    fn contains_point_on_octagon_uses_hull() {
        let shape = Shape::new(ShapeKind::Octagon3D).with_points(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(4.0, -4.0),
            Point::new(14.0, 6.0),
            Point::new(14.0, -4.0),
            Point::new(4.0, 6.0),
        ]);
        assert!(shape.contains_point(Point::new(12.0, -2.0)));
        let rect = shape.bounding_rect().expect("outline");
        assert_eq!((rect.xmin(), rect.ymax()), (0.0, 10.0));
    }

    #[test]
    fn serde_skips_session_state() {
        let mut shape = Shape::new(ShapeKind::Tetragon)
            .with_label("sign")
            .with_points(square(2.0))
            .with_angle(10);
        shape.selected = true;

        let json = serde_json::to_value(&shape).expect("serialize");
        assert_eq!(json["kind"], "tetragon");
        assert_eq!(json["angle"], 10);
        assert!(json.get("selected").is_none());

        let back: Shape = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back.label(), Some("sign"));
        assert_eq!(back.kind(), ShapeKind::Tetragon);
        assert!(!back.selected);
    }
}
