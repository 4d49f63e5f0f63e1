//! In-memory annotation model and its file codecs.
//!
//! Everything here is expressed in canvas pixels (`Coord<Pixel>`, aliased as
//! [`Point`]); only the detector export moves into normalized space.
//!
//! # Layers
//!
//! 1. [`geometry`]: rotation, centroid, convex perimeter and hit tests.
//! 2. [`Shape`]: one annotation (box, rotated box, tetragon or 3D octagon).
//! 3. [`AnnotationDocument`]: one image's metadata plus its shapes.
//! 4. [`io_voc_xml`] and [`io_yolo`]: the annotation file and the detector
//!    export.
//!
//! # Example
//!
//! ```
//! use rotolabel::ir::{AnnotationDocument, ImageSize, Point, Shape, ShapeKind};
//! use rotolabel::ir::io_voc_xml::{from_voc_xml_str, to_voc_xml_string};
//!
//! let shape = Shape::new(ShapeKind::Tetragon).with_label("sign").with_points(vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(10.0, 0.0),
//!     Point::new(10.0, 10.0),
//!     Point::new(0.0, 10.0),
//! ]);
//! let doc = AnnotationDocument::new("images", "a.jpg", ImageSize::new(64, 48))
//!     .with_shapes(vec![shape]);
//!
//! let xml = to_voc_xml_string(&doc).unwrap();
//! let back = from_voc_xml_str(&xml).unwrap();
//! assert_eq!(back.shapes[0].kind(), ShapeKind::Tetragon);
//! ```

mod bbox;
mod coord;
pub mod geometry;
pub mod io_voc_xml;
pub mod io_yolo;
mod model;
mod report;
mod shape;
mod space;
mod style;

pub use bbox::BBoxXYXY;
pub use coord::{Coord, Point};
pub use geometry::{
    centroid, contains_point, convex_perimeter, nearest_vertex, rotate_point, Perimeter,
};
pub use model::{AnnotationDocument, ImageSize, DEFAULT_DATABASE};
pub use report::{DecodeIssue, DecodeIssueCode, DecodeReport};
pub use shape::{normalize_angle, HighlightMode, Shape, ShapeKind, ROTATION_HANDLE_OFFSET};
pub use space::{Normalized, Pixel};
pub use style::{PointType, Rgba, ShapeStyle};
