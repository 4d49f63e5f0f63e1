//! Pascal VOC style annotation XML, extended for rotated and free shapes.
//!
//! On top of the usual VOC layout each `<object>` carries `<tetragon>`,
//! `<shape3D>` and `<angle>`, and its `<bndbox>` holds either the canonical
//! `xmin/ymin/xmax/ymax` of a (possibly rotated) rectangle or the raw keypoints
//! `k0x, k0y, ...` of a tetragon (4) or 3D octagon (8):
//!
//! ```xml
//! <annotation verified="yes">
//!     <folder>images</folder>
//!     <filename>0001.jpg</filename>
//!     <path>/data/images/0001.jpg</path>
//!     <source>
//!         <database>Unknown</database>
//!     </source>
//!     <size>
//!         <width>640</width>
//!         <height>480</height>
//!         <depth>3</depth>
//!     </size>
//!     <segmented>0</segmented>
//!     <object>
//!         <name>car</name>
//!         <pose>Unspecified</pose>
//!         <truncated>0</truncated>
//!         <difficult>0</difficult>
//!         <tetragon>False</tetragon>
//!         <shape3D>False</shape3D>
//!         <angle>30</angle>
//!         <bndbox>
//!             <xmin>100</xmin>
//!             <ymin>120</ymin>
//!             <xmax>220</xmax>
//!             <ymax>180</ymax>
//!         </bndbox>
//!     </object>
//! </annotation>
//! ```
//!
//! Rotated rectangles are stored un-rotated: the writer turns the diagonal
//! corners back by `-angle` and the reader turns the canonical corners forward
//! by `+angle`, so a saved file reopens to the same on-canvas quadrilateral.

use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::Node;

use super::geometry::rotate_point;
use super::model::{AnnotationDocument, ImageSize};
use super::report::{DecodeIssueCode, DecodeReport};
use super::shape::{normalize_angle, Shape, ShapeKind};
use super::{BBoxXYXY, Pixel, Point};
use crate::error::RotolabelError;

/// Extension of annotation files, compared case-insensitively.
pub const ANNOTATION_EXTENSION: &str = "xml";

const MEMORY_PATH: &str = "<memory>";
const POSE: &str = "Unspecified";

/// Read and decode one annotation file.
pub fn read_voc_xml(path: &Path) -> Result<AnnotationDocument, RotolabelError> {
    read_voc_xml_with_report(path).map(|(document, _)| document)
}

/// Like [`read_voc_xml`], also returning the defaults applied while decoding.
pub fn read_voc_xml_with_report(
    path: &Path,
) -> Result<(AnnotationDocument, DecodeReport), RotolabelError> {
    let xml = fs::read_to_string(path).map_err(RotolabelError::Io)?;
    let mut report = DecodeReport::new();
    let document = parse_voc_xml_str(&xml, path, &mut report)?;
    Ok((document, report))
}

/// Encode `document` and write it to `path`, replacing any existing file.
pub fn write_voc_xml(path: &Path, document: &AnnotationDocument) -> Result<(), RotolabelError> {
    let xml = to_voc_xml_string(document)?;
    fs::write(path, xml).map_err(RotolabelError::Io)
}

/// Decode an annotation document from a UTF-8 string.
pub fn from_voc_xml_str(xml: &str) -> Result<AnnotationDocument, RotolabelError> {
    from_voc_xml_str_with_report(xml).map(|(document, _)| document)
}

/// Decode from a string, also returning the defaults applied while decoding.
pub fn from_voc_xml_str_with_report(
    xml: &str,
) -> Result<(AnnotationDocument, DecodeReport), RotolabelError> {
    let mut report = DecodeReport::new();
    let document = parse_voc_xml_str(xml, Path::new(MEMORY_PATH), &mut report)?;
    Ok((document, report))
}

/// Decode an annotation document from bytes.
///
/// The input must be valid UTF-8.
pub fn from_voc_xml_slice(bytes: &[u8]) -> Result<AnnotationDocument, RotolabelError> {
    let xml = std::str::from_utf8(bytes).map_err(|source| RotolabelError::AnnotationXmlParse {
        path: PathBuf::from(MEMORY_PATH),
        message: format!("input is not valid UTF-8: {source}"),
    })?;
    from_voc_xml_str(xml)
}

/// Encode a document as tab-indented UTF-8 XML text.
///
/// Fails if a shape has no label or the wrong number of points for its kind.
pub fn to_voc_xml_string(document: &AnnotationDocument) -> Result<String, RotolabelError> {
    let objects = document
        .shapes
        .iter()
        .enumerate()
        .map(|(index, shape)| encode_shape(index, shape))
        .collect::<Result<Vec<_>, _>>()?;

    let mut xml = XmlBuilder::new();
    if document.verified {
        xml.open_with_attr("annotation", "verified", "yes");
    } else {
        xml.open("annotation");
    }
    xml.leaf("folder", &document.folder);
    xml.leaf("filename", &document.filename);
    if let Some(path) = &document.path {
        xml.leaf("path", path);
    }
    xml.open("source");
    xml.leaf("database", document.database_or_default());
    xml.close("source");
    xml.open("size");
    xml.leaf("width", &document.size.width.to_string());
    xml.leaf("height", &document.size.height.to_string());
    xml.leaf("depth", &document.size.depth_or_default().to_string());
    xml.close("size");
    xml.leaf("segmented", "0");

    for object in &objects {
        write_object(&mut xml, object, &document.size);
    }

    xml.close("annotation");
    Ok(xml.finish())
}

#[derive(Debug, PartialEq)]
struct EncodedObject<'a> {
    name: &'a str,
    difficult: bool,
    angle: i32,
    bndbox: EncodedBndBox,
}

#[derive(Debug, PartialEq)]
enum EncodedBndBox {
    Canonical {
        xmin: i64,
        ymin: i64,
        xmax: i64,
        ymax: i64,
    },
    Tetragon(Vec<(i64, i64)>),
    Octagon3D(Vec<(i64, i64)>),
}

fn encode_shape(index: usize, shape: &Shape) -> Result<EncodedObject<'_>, RotolabelError> {
    // A blank name would come back as a missing one.
    let name = shape
        .label()
        .filter(|label| !label.trim().is_empty())
        .ok_or(RotolabelError::UnlabeledShape { index })?;

    let kind = shape.kind();
    if !shape.is_complete() {
        return Err(RotolabelError::InvalidShape {
            index,
            message: format!(
                "{:?} needs {} points, found {}",
                kind,
                kind.point_count(),
                shape.len()
            ),
        });
    }

    let points = shape.points();
    let bndbox = match kind {
        ShapeKind::Box | ShapeKind::RotatedBox => {
            encode_canonical_box(points[0], points[2], shape.angle())
        }
        ShapeKind::Tetragon => {
            EncodedBndBox::Tetragon(points.iter().map(|p| whole(p.round())).collect())
        }
        ShapeKind::Octagon3D => {
            EncodedBndBox::Octagon3D(points.iter().map(|p| whole(p.trunc())).collect())
        }
    };

    Ok(EncodedObject {
        name,
        difficult: shape.difficult(),
        angle: shape.angle(),
        bndbox,
    })
}

// The diagonal corners are clamped to the 1-based image origin. An upright
// box is cut to whole pixels; a rotated one is turned back to its canonical
// extent first and rounded only once, after the rotation.
fn encode_canonical_box(first: Point, third: Point, angle: i32) -> EncodedBndBox {
    let xmin = first.x.max(1.0);
    let ymin = first.y.max(1.0);

    if angle == 0 {
        return EncodedBndBox::Canonical {
            xmin: xmin.trunc() as i64,
            ymin: ymin.trunc() as i64,
            xmax: third.x.trunc() as i64,
            ymax: third.y.trunc() as i64,
        };
    }

    let bbox = BBoxXYXY::<Pixel>::from_xyxy(xmin, ymin, third.x, third.y);
    let center = bbox.center();
    let (kxmin, kymin) = whole(rotate_point(center, bbox.min, -f64::from(angle)).round());
    let (kxmax, kymax) = whole(rotate_point(center, bbox.max, -f64::from(angle)).round());
    EncodedBndBox::Canonical {
        xmin: kxmin,
        ymin: kymin,
        xmax: kxmax,
        ymax: kymax,
    }
}

fn whole(point: Point) -> (i64, i64) {
    (point.x as i64, point.y as i64)
}

fn truncated_flag(bndbox: &EncodedBndBox, size: &ImageSize) -> &'static str {
    match *bndbox {
        EncodedBndBox::Canonical {
            xmin,
            ymin,
            xmax,
            ymax,
        } => {
            let touches_y = ymax == i64::from(size.height) || ymin == 1;
            let touches_x = xmax == i64::from(size.width) || xmin == 1;
            if touches_y || touches_x {
                "1"
            } else {
                "0"
            }
        }
        EncodedBndBox::Tetragon(_) | EncodedBndBox::Octagon3D(_) => "0",
    }
}

fn write_object(xml: &mut XmlBuilder, object: &EncodedObject<'_>, size: &ImageSize) {
    let (tetragon, shape3d) = match object.bndbox {
        EncodedBndBox::Canonical { .. } => (false, false),
        EncodedBndBox::Tetragon(_) => (true, false),
        EncodedBndBox::Octagon3D(_) => (false, true),
    };

    xml.open("object");
    xml.leaf("name", object.name);
    xml.leaf("pose", POSE);
    xml.leaf("truncated", truncated_flag(&object.bndbox, size));
    xml.leaf("difficult", if object.difficult { "1" } else { "0" });
    xml.leaf("tetragon", python_bool(tetragon));
    xml.leaf("shape3D", python_bool(shape3d));
    xml.leaf("angle", &object.angle.to_string());
    xml.open("bndbox");
    match &object.bndbox {
        EncodedBndBox::Canonical {
            xmin,
            ymin,
            xmax,
            ymax,
        } => {
            xml.leaf("xmin", &xmin.to_string());
            xml.leaf("ymin", &ymin.to_string());
            xml.leaf("xmax", &xmax.to_string());
            xml.leaf("ymax", &ymax.to_string());
        }
        EncodedBndBox::Tetragon(keypoints) | EncodedBndBox::Octagon3D(keypoints) => {
            for (i, (x, y)) in keypoints.iter().enumerate() {
                xml.leaf(&format!("k{i}x"), &x.to_string());
                xml.leaf(&format!("k{i}y"), &y.to_string());
            }
        }
    }
    xml.close("bndbox");
    xml.close("object");
}

// Existing files spell the kind flags this way.
fn python_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Minimal pretty-printer: one element per line, tab indentation.
struct XmlBuilder {
    out: String,
    depth: usize,
}

impl XmlBuilder {
    fn new() -> Self {
        Self {
            out: String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n"),
            depth: 0,
        }
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push('\t');
        }
    }

    fn open(&mut self, tag: &str) {
        self.indent();
        self.out.push_str(&format!("<{tag}>\n"));
        self.depth += 1;
    }

    fn open_with_attr(&mut self, tag: &str, attr: &str, value: &str) {
        self.indent();
        self.out
            .push_str(&format!("<{tag} {attr}=\"{}\">\n", xml_escape(value)));
        self.depth += 1;
    }

    fn leaf(&mut self, tag: &str, text: &str) {
        self.indent();
        self.out
            .push_str(&format!("<{tag}>{}</{tag}>\n", xml_escape(text)));
    }

    fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.indent();
        self.out.push_str(&format!("</{tag}>\n"));
    }

    fn finish(self) -> String {
        self.out
    }
}

fn xml_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn parse_voc_xml_str(
    xml: &str,
    path: &Path,
    report: &mut DecodeReport,
) -> Result<AnnotationDocument, RotolabelError> {
    let document =
        roxmltree::Document::parse(xml).map_err(|source| RotolabelError::AnnotationXmlParse {
            path: path.to_path_buf(),
            message: source.to_string(),
        })?;

    let annotation = document.root_element();
    if annotation.tag_name().name() != "annotation" {
        return Err(RotolabelError::AnnotationXmlParse {
            path: path.to_path_buf(),
            message: "missing <annotation> root element".to_string(),
        });
    }

    let verified = annotation.attribute("verified") == Some("yes");
    let filename = required_child_text(annotation, "filename", path, "<annotation>")?;
    let folder = optional_child_text(annotation, "folder").unwrap_or_default();
    let image_path = optional_child_text(annotation, "path");
    let database = child_element(annotation, "source")
        .and_then(|source| optional_child_text(source, "database"));

    let size_node = required_child_element(annotation, "size", path, "<annotation>")?;
    let size = ImageSize {
        width: parse_required_u32(size_node, "width", path, "<size>")?,
        height: parse_required_u32(size_node, "height", path, "<size>")?,
        depth: optional_child_text(size_node, "depth")
            .map(|raw| {
                raw.parse::<u32>()
                    .map_err(|_| RotolabelError::AnnotationXmlParse {
                        path: path.to_path_buf(),
                        message: format!("invalid <depth> value '{raw}' in <size>; expected u32"),
                    })
            })
            .transpose()?,
    };

    let mut shapes = Vec::new();
    for (index, object) in annotation
        .children()
        .filter(|node| node.is_element() && node.tag_name().name() == "object")
        .enumerate()
    {
        shapes.push(parse_object(object, index, path, report)?);
    }

    Ok(AnnotationDocument {
        folder,
        filename,
        path: image_path,
        database,
        size,
        verified,
        shapes,
    })
}

fn parse_object(
    object: Node<'_, '_>,
    index: usize,
    path: &Path,
    report: &mut DecodeReport,
) -> Result<Shape, RotolabelError> {
    let name = required_label_text(object, path)?;
    let bndbox = required_child_element(object, "bndbox", path, "<object>")?;

    let difficult = optional_flag(
        object,
        "difficult",
        index,
        report,
        DecodeIssueCode::UnrecognizedDifficult,
    );
    let tetragon = optional_flag(
        object,
        "tetragon",
        index,
        report,
        DecodeIssueCode::UnrecognizedKindFlag,
    );
    let shape3d = optional_flag(
        object,
        "shape3D",
        index,
        report,
        DecodeIssueCode::UnrecognizedKindFlag,
    );

    let angle = match optional_child_text(object, "angle") {
        None => 0,
        Some(raw) => raw.parse::<i32>().map(normalize_angle).unwrap_or_else(|_| {
            report.warn(
                DecodeIssueCode::UnparsableAngle,
                index,
                format!("invalid <angle> value '{raw}'; using 0"),
            );
            0
        }),
    };

    // shape3D takes precedence over tetragon; with both decoded to plain
    // booleans every combination maps to exactly one kind.
    let shape = match (shape3d, tetragon) {
        (true, _) => Shape::new(ShapeKind::Octagon3D)
            .with_points(parse_keypoints(bndbox, ShapeKind::Octagon3D.point_count(), path)?),
        (false, true) => Shape::new(ShapeKind::Tetragon)
            .with_points(parse_keypoints(bndbox, ShapeKind::Tetragon.point_count(), path)?),
        (false, false) => {
            Shape::new(ShapeKind::Box).with_points(parse_canonical_box(bndbox, angle, path)?)
        }
    };

    let mut shape = shape
        .with_label(name)
        .with_angle(angle)
        .with_difficult(difficult);
    shape.close();
    Ok(shape)
}

fn parse_canonical_box(
    bndbox: Node<'_, '_>,
    angle: i32,
    path: &Path,
) -> Result<Vec<Point>, RotolabelError> {
    let bbox = BBoxXYXY::<Pixel>::from_xyxy(
        parse_required_f64(bndbox, "xmin", path, "<bndbox>")?,
        parse_required_f64(bndbox, "ymin", path, "<bndbox>")?,
        parse_required_f64(bndbox, "xmax", path, "<bndbox>")?,
        parse_required_f64(bndbox, "ymax", path, "<bndbox>")?,
    );

    let corners = bbox.corners();
    if angle == 0 {
        return Ok(corners.to_vec());
    }

    let center = bbox.center();
    Ok(corners
        .iter()
        .map(|corner| rotate_point(center, *corner, f64::from(angle)).round())
        .collect())
}

fn parse_keypoints(
    bndbox: Node<'_, '_>,
    count: usize,
    path: &Path,
) -> Result<Vec<Point>, RotolabelError> {
    (0..count)
        .map(|i| {
            let x = parse_required_f64(bndbox, &format!("k{i}x"), path, "<bndbox>")?;
            let y = parse_required_f64(bndbox, &format!("k{i}y"), path, "<bndbox>")?;
            Ok(Point::new(x, y))
        })
        .collect()
}

fn optional_flag(
    node: Node<'_, '_>,
    tag: &str,
    index: usize,
    report: &mut DecodeReport,
    code: DecodeIssueCode,
) -> bool {
    let Some(raw) = optional_child_text(node, tag) else {
        return false;
    };
    parse_bool_text(&raw).unwrap_or_else(|| {
        report.warn(
            code,
            index,
            format!("invalid <{tag}> value '{raw}'; using false"),
        );
        false
    })
}

fn parse_bool_text(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        other => other.parse::<i64>().ok().map(|value| value != 0),
    }
}

fn required_child_element<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<Node<'a, 'input>, RotolabelError> {
    child_element(node, tag).ok_or_else(|| RotolabelError::AnnotationXmlParse {
        path: path.to_path_buf(),
        message: format!("missing <{tag}> in {context}"),
    })
}

fn required_child_text(
    node: Node<'_, '_>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<String, RotolabelError> {
    optional_child_text(node, tag).ok_or_else(|| RotolabelError::AnnotationXmlParse {
        path: path.to_path_buf(),
        message: format!("missing <{tag}> in {context}"),
    })
}

fn parse_required_u32(
    node: Node<'_, '_>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<u32, RotolabelError> {
    let raw = required_child_text(node, tag, path, context)?;
    raw.parse::<u32>()
        .map_err(|_| RotolabelError::AnnotationXmlParse {
            path: path.to_path_buf(),
            message: format!("invalid <{tag}> value '{raw}' in {context}; expected u32"),
        })
}

fn parse_required_f64(
    node: Node<'_, '_>,
    tag: &str,
    path: &Path,
    context: &str,
) -> Result<f64, RotolabelError> {
    let raw = required_child_text(node, tag, path, context)?;
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| RotolabelError::AnnotationXmlParse {
            path: path.to_path_buf(),
            message: format!("invalid <{tag}> value '{raw}' in {context}; expected a number"),
        })
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == tag)
}

// Labels are kept verbatim; every other text field is trimmed.
fn required_label_text(object: Node<'_, '_>, path: &Path) -> Result<String, RotolabelError> {
    child_element(object, "name")
        .and_then(|child| child.text())
        .filter(|text| !text.trim().is_empty())
        .map(ToOwned::to_owned)
        .ok_or_else(|| RotolabelError::AnnotationXmlParse {
            path: path.to_path_buf(),
            message: "missing <name> in <object>".to_string(),
        })
}

fn optional_child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    child_element(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
}

/// Fuzz-only entrypoint exercising encode after a successful decode.
#[cfg(feature = "fuzzing")]
pub fn fuzz_decode_encode(bytes: &[u8]) -> Result<(), RotolabelError> {
    let document = from_voc_xml_slice(bytes)?;
    let _ = to_voc_xml_string(&document)?;
    Ok(())
}
