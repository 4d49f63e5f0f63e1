use std::path::PathBuf;
use thiserror::Error;

/// The main error type for rotolabel operations.
#[derive(Debug, Error)]
pub enum RotolabelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse annotation XML {path}: {message}")]
    AnnotationXmlParse { path: PathBuf, message: String },

    #[error("Unsupported annotation file extension: {path} (expected .xml)")]
    UnsupportedExtension { path: PathBuf },

    #[error("Shape {index} has no label and cannot be saved")]
    UnlabeledShape { index: usize },

    #[error("Shape {index} is malformed: {message}")]
    InvalidShape { index: usize, message: String },

    #[error("Label '{label}' is not in the label list (exporting {path})")]
    MissingLabelInList { label: String, path: PathBuf },

    #[error("Image {path} has zero width or height")]
    EmptyImage { path: PathBuf },

    #[error("Failed to read image dimensions from {path}: {source}")]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Failed to read image format from {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid label list {path}: {message}")]
    LabelListParse { path: PathBuf, message: String },

    #[error("Failed to parse label list YAML from {path}: {source}")]
    LabelListYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to write JSON output: {0}")]
    JsonWrite(#[source] serde_json::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
