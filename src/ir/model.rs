//! The persisted unit: one image's metadata and its shapes.

use serde::{Deserialize, Serialize};

use super::shape::Shape;

/// Database name written when the caller does not supply one.
pub const DEFAULT_DATABASE: &str = "Unknown";

/// Pixel dimensions and channel depth of the annotated image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
    /// Channel count (1 grayscale, 3 color). Written as 1 when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            depth: None,
        }
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Depth as persisted: the known depth, else 1.
    pub fn depth_or_default(&self) -> u32 {
        self.depth.unwrap_or(1)
    }
}

/// One annotation file's worth of data.
///
/// Built fresh for every save and handed to the writer as-is; the reader
/// produces a new one per decode.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationDocument {
    /// Name of the directory holding the image.
    pub folder: String,

    /// Image file name.
    pub filename: String,

    /// Local path of the image, omitted from the file when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// `source/database`; [`DEFAULT_DATABASE`] is written when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    pub size: ImageSize,

    /// A person has reviewed every shape in this file.
    #[serde(default)]
    pub verified: bool,

    /// Shapes in file order.
    #[serde(default)]
    pub shapes: Vec<Shape>,
}

impl AnnotationDocument {
    pub fn new(folder: impl Into<String>, filename: impl Into<String>, size: ImageSize) -> Self {
        Self {
            folder: folder.into(),
            filename: filename.into(),
            size,
            ..Default::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    pub fn with_shapes(mut self, shapes: Vec<Shape>) -> Self {
        self.shapes = shapes;
        self
    }

    pub fn database_or_default(&self) -> &str {
        self.database.as_deref().unwrap_or(DEFAULT_DATABASE)
    }
}
