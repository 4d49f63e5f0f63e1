//! Detector-training label export (YOLO-style text, extended with angle).
//!
//! One line per shape, written to a `.txt` file beside the image:
//!
//! ```text
//! <class> <cx> <cy> <w> <h> <angle/360>                 # box, rotated box
//! <class> <x0> <y0> ... <x3> <y3> <angle/360>           # tetragon
//! <class> <x0> <y0> ... <x7> <y7> <angle/360>           # 3D octagon
//! ```
//!
//! `class` is the shape label's position in an ordered label list and every
//! coordinate is normalized to the image. Rectangles are exported from their
//! canonical (un-rotated) box; the angle column carries the rotation.
//!
//! The ordered label list is read either from a plain `classes.txt` (one
//! label per line) or from a YOLO `data.yaml` `names:` entry.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::model::ImageSize;
use super::shape::{Shape, ShapeKind};
use super::{BBoxXYXY, Pixel};
use crate::error::RotolabelError;

/// Extension of exported label files.
pub const LABEL_EXTENSION: &str = "txt";

const MEMORY_PATH: &str = "<memory>";
const YAML_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Encode `shapes` as detector label lines.
///
/// All-or-nothing: the first shape whose label is missing from `labels`
/// fails the whole encode.
pub fn to_yolo_label_string(
    shapes: &[Shape],
    size: ImageSize,
    labels: &[String],
) -> Result<String, RotolabelError> {
    encode_lines(shapes, size, labels, Path::new(MEMORY_PATH))
}

/// Write the label file for `image_path`, replacing its extension with
/// `.txt`. Any existing file is overwritten. Returns the path written.
pub fn write_yolo_labels(
    image_path: &Path,
    size: ImageSize,
    shapes: &[Shape],
    labels: &[String],
) -> Result<PathBuf, RotolabelError> {
    let label_path = label_path_for_image(image_path);
    let content = encode_lines(shapes, size, labels, &label_path)?;
    fs::write(&label_path, content).map_err(RotolabelError::Io)?;
    log::debug!(
        "wrote {} detector label(s) to {}",
        shapes.len(),
        label_path.display()
    );
    Ok(label_path)
}

/// Sibling `.txt` path of an image.
pub fn label_path_for_image(image_path: &Path) -> PathBuf {
    image_path.with_extension(LABEL_EXTENSION)
}

fn encode_lines(
    shapes: &[Shape],
    size: ImageSize,
    labels: &[String],
    path: &Path,
) -> Result<String, RotolabelError> {
    if size.width == 0 || size.height == 0 {
        return Err(RotolabelError::EmptyImage {
            path: path.to_path_buf(),
        });
    }
    let (width, height) = (f64::from(size.width), f64::from(size.height));

    let mut out = String::new();
    for (index, shape) in shapes.iter().enumerate() {
        let label = shape
            .label()
            .ok_or(RotolabelError::UnlabeledShape { index })?;
        let class_id = labels.iter().position(|name| name == label).ok_or_else(|| {
            RotolabelError::MissingLabelInList {
                label: label.to_string(),
                path: path.to_path_buf(),
            }
        })?;

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

        let mut fields = Vec::with_capacity(kind.point_count() * 2 + 1);
        match kind {
            ShapeKind::Box | ShapeKind::RotatedBox => {
                let bbox = shape
                    .canonical_box()
                    .map(ordered)
                    .ok_or_else(|| RotolabelError::InvalidShape {
                        index,
                        message: "rectangle has no diagonal corners".to_string(),
                    })?;
                let (cx, cy, w, h) = bbox.to_normalized(width, height).to_cxcywh();
                fields.extend([cx, cy, w, h]);
            }
            ShapeKind::Tetragon | ShapeKind::Octagon3D => {
                for point in shape.points() {
                    let point = point.round();
                    fields.push(point.x / width);
                    fields.push(point.y / height);
                }
            }
        }
        fields.push(f64::from(shape.angle()) / 360.0);

        out.push_str(&class_id.to_string());
        for value in fields {
            out.push_str(&format!(" {value:.6}"));
        }
        out.push('\n');
    }

    Ok(out)
}

// Corners may have been drawn in any direction.
fn ordered(bbox: BBoxXYXY<Pixel>) -> BBoxXYXY<Pixel> {
    BBoxXYXY::from_xyxy(
        bbox.xmin().min(bbox.xmax()),
        bbox.ymin().min(bbox.ymax()),
        bbox.xmin().max(bbox.xmax()),
        bbox.ymin().max(bbox.ymax()),
    )
}

/// Read an ordered label list.
///
/// `.yaml`/`.yml` files are read as a YOLO `data.yaml` (`names:` as a list or
/// an index mapping); anything else as one label per line.
pub fn read_label_list(path: &Path) -> Result<Vec<String>, RotolabelError> {
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| YAML_EXTENSIONS.iter().any(|y| ext.eq_ignore_ascii_case(y)));

    if is_yaml {
        read_data_yaml_names(path)
    } else {
        read_classes_txt(path)
    }
}

#[derive(Debug, Deserialize)]
struct DataYaml {
    names: DataYamlNames,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DataYamlNames {
    Sequence(Vec<String>),
    Mapping(BTreeMap<usize, String>),
}

fn read_data_yaml_names(path: &Path) -> Result<Vec<String>, RotolabelError> {
    let data = fs::read_to_string(path).map_err(RotolabelError::Io)?;
    let parsed: DataYaml =
        serde_yaml::from_str(&data).map_err(|source| RotolabelError::LabelListYaml {
            path: path.to_path_buf(),
            source,
        })?;

    let names = match parsed.names {
        DataYamlNames::Sequence(names) => names,
        DataYamlNames::Mapping(mapping) => {
            let Some(&max_index) = mapping.keys().next_back() else {
                return Ok(Vec::new());
            };
            let mut names = vec![String::new(); max_index + 1];
            for (index, name) in mapping {
                names[index] = name;
            }
            if let Some(gap) = names.iter().position(|name| name.trim().is_empty()) {
                return Err(RotolabelError::LabelListParse {
                    path: path.to_path_buf(),
                    message: format!("no name for class index {gap}"),
                });
            }
            names
        }
    };

    Ok(names)
}

fn read_classes_txt(path: &Path) -> Result<Vec<String>, RotolabelError> {
    let data = fs::read_to_string(path).map_err(RotolabelError::Io)?;
    let mut names = Vec::new();

    for (line_idx, line) in data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(RotolabelError::LabelListParse {
                path: path.to_path_buf(),
                message: format!("line {} is empty", line_idx + 1),
            });
        }
        names.push(trimmed.to_string());
    }

    Ok(names)
}
