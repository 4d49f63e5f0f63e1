//! Annotation file facade: ties the codec to paths on disk.
//!
//! A [`LabelFile`] is the working set of one editing session: the shapes,
//! the image they belong to, the image's raw bytes and the verified flag.
//! Loading replaces all of it; nothing is merged.

use std::fs;
use std::path::{Path, PathBuf};

use image::ImageDecoder;

use crate::error::RotolabelError;
use crate::ir::io_voc_xml::{self, ANNOTATION_EXTENSION};
use crate::ir::io_yolo;
use crate::ir::{AnnotationDocument, ImageSize, Shape};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LabelFile {
    pub shapes: Vec<Shape>,
    pub image_path: Option<PathBuf>,
    /// Raw bytes of the image, empty when it could not be read.
    pub image_data: Vec<u8>,
    pub verified: bool,
}

impl LabelFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `path` has the annotation suffix, ignoring case.
    pub fn is_label_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(ANNOTATION_EXTENSION))
    }

    /// Read an annotation file and, best effort, the image it points at.
    ///
    /// The image is looked up at the document's `path`, falling back to its
    /// `filename` next to the annotation file. A missing or unreadable image
    /// leaves `image_data` empty and is only logged.
    pub fn load(path: &Path) -> Result<Self, RotolabelError> {
        if !Self::is_label_file(path) {
            return Err(RotolabelError::UnsupportedExtension {
                path: path.to_path_buf(),
            });
        }

        let document = io_voc_xml::read_voc_xml(path)?;
        let image_path = resolve_image_path(path, &document);
        let image_data = match fs::read(&image_path) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!(
                    "could not read image {} for {}: {err}",
                    image_path.display(),
                    path.display()
                );
                Vec::new()
            }
        };

        Ok(Self {
            shapes: document.shapes,
            image_path: Some(image_path),
            image_data,
            verified: document.verified,
        })
    }

    /// Write `shapes` for the image at `image_path` to `path`.
    ///
    /// Size and depth are probed from the image file itself, never from
    /// `image_data`, which may be stale.
    pub fn save(
        &self,
        path: &Path,
        shapes: &[Shape],
        image_path: &Path,
    ) -> Result<(), RotolabelError> {
        let document = self.document_for(shapes, image_path)?;
        io_voc_xml::write_voc_xml(path, &document)?;
        log::debug!("saved {} shape(s) to {}", shapes.len(), path.display());
        Ok(())
    }

    /// Write the detector export for `image_path` beside the image.
    pub fn save_detector_labels(
        &self,
        image_path: &Path,
        shapes: &[Shape],
        labels: &[String],
    ) -> Result<PathBuf, RotolabelError> {
        let size = probe_image(image_path)?;
        io_yolo::write_yolo_labels(image_path, size, shapes, labels)
    }

    pub fn toggle_verify(&mut self) {
        self.verified = !self.verified;
    }

    fn document_for(
        &self,
        shapes: &[Shape],
        image_path: &Path,
    ) -> Result<AnnotationDocument, RotolabelError> {
        let folder = image_path
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let filename = image_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(AnnotationDocument::new(folder, filename, probe_image(image_path)?)
            .with_path(image_path.to_string_lossy())
            .with_verified(self.verified)
            .with_shapes(shapes.to_vec()))
    }
}

/// Image the annotation refers to: its stored `path`, else `filename`
/// beside the annotation file.
pub fn resolve_image_path(annotation_path: &Path, document: &AnnotationDocument) -> PathBuf {
    match &document.path {
        Some(path) => PathBuf::from(path),
        None => annotation_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(&document.filename),
    }
}

/// Width, height and channel depth of an image file.
///
/// Dimensions come from the file header; depth is 1 for grayscale and 3 for
/// anything with color (alpha is not counted).
pub fn probe_image(path: &Path) -> Result<ImageSize, RotolabelError> {
    let dimensions = imagesize::size(path).map_err(|source| RotolabelError::ImageDimensionRead {
        path: path.to_path_buf(),
        source,
    })?;

    let decoder = image::ImageReader::open(path)
        .map_err(RotolabelError::Io)?
        .with_guessed_format()
        .map_err(RotolabelError::Io)?
        .into_decoder()
        .map_err(|source| RotolabelError::ImageDecode {
            path: path.to_path_buf(),
            source,
        })?;
    let depth = if decoder.color_type().has_color() { 3 } else { 1 };

    let width = u32::try_from(dimensions.width).unwrap_or(u32::MAX);
    let height = u32::try_from(dimensions.height).unwrap_or(u32::MAX);
    Ok(ImageSize::new(width, height).with_depth(depth))
}
