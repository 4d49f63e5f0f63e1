//! Rotolabel: rotated-box, tetragon and 3D-octagon image annotations.
//!
//! The library holds the annotation model and its two file formats: a Pascal
//! VOC style XML document that round-trips every shape kind, and a flat
//! detector-training export. Drawing and interaction live in the caller; this
//! crate only owns what gets persisted plus the geometry needed to derive it.
//!
//! # Modules
//!
//! - [`ir`]: shapes, documents, geometry and the codecs
//! - [`label_file`]: load/save of annotation files next to their images
//! - [`error`]: error types for rotolabel operations

pub mod error;
pub mod ir;
pub mod label_file;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use walkdir::WalkDir;

pub use error::RotolabelError;
pub use label_file::LabelFile;

use ir::io_voc_xml;
use ir::io_yolo;
use ir::{AnnotationDocument, DecodeIssue, Shape};

/// The rotolabel CLI application.
#[derive(Parser)]
#[command(name = "rotolabel")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Print the contents of an annotation file.
    Inspect(InspectArgs),
    /// Write detector-training label files next to the images.
    Export(ExportArgs),
    /// Mark an annotation file as reviewed (or not).
    Verify(VerifyArgs),
}

#[derive(clap::Args)]
struct InspectArgs {
    /// Annotation file to read.
    input: PathBuf,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

#[derive(clap::Args)]
struct ExportArgs {
    /// Annotation file, or a directory searched recursively for them.
    input: PathBuf,

    /// Ordered label list: classes.txt (one per line) or data.yaml.
    #[arg(long, env = "ROTOLABEL_CLASSES")]
    classes: PathBuf,
}

#[derive(clap::Args)]
struct VerifyArgs {
    /// Annotation file to update in place.
    input: PathBuf,

    /// Clear the verified flag instead of setting it.
    #[arg(long)]
    unset: bool,
}

/// Run the rotolabel CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), RotolabelError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Inspect(args)) => run_inspect(args),
        Some(Commands::Export(args)) => run_export(args),
        Some(Commands::Verify(args)) => run_verify(args),
        None => {
            println!("rotolabel {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Rotated-box, tetragon and 3D-octagon image annotations.");
            println!();
            println!("Run 'rotolabel --help' for usage information.");
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct InspectJson<'a> {
    document: &'a AnnotationDocument,
    warnings: &'a [DecodeIssue],
}

fn run_inspect(args: InspectArgs) -> Result<(), RotolabelError> {
    let input = annotation_path(args.input)?;
    let (document, report) = io_voc_xml::read_voc_xml_with_report(&input)?;

    match args.output.as_str() {
        "text" => {
            println!("File: {}", document.filename);
            println!("Folder: {}", document.folder);
            if let Some(path) = &document.path {
                println!("Path: {}", path);
            }
            println!(
                "Size: {}x{}x{}",
                document.size.width,
                document.size.height,
                document.size.depth_or_default()
            );
            println!("Verified: {}", if document.verified { "yes" } else { "no" });
            println!("Shapes ({}):", document.shapes.len());
            for (index, shape) in document.shapes.iter().enumerate() {
                println!("  [{}] {}", index, describe_shape(shape));
            }
            print!("{}", report);
            Ok(())
        }
        "json" => {
            let payload = InspectJson {
                document: &document,
                warnings: &report.issues,
            };
            let json = serde_json::to_string_pretty(&payload).map_err(RotolabelError::JsonWrite)?;
            println!("{}", json);
            Ok(())
        }
        other => Err(RotolabelError::UnsupportedFormat(format!(
            "'{}' (supported: text, json)",
            other
        ))),
    }
}

fn describe_shape(shape: &Shape) -> String {
    let points = shape
        .points()
        .iter()
        .map(|p| format!("({}, {})", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "{:?} '{}' angle={} difficult={} points={}",
        shape.kind(),
        shape.label().unwrap_or(""),
        shape.angle(),
        shape.difficult(),
        points
    )
}

fn run_export(args: ExportArgs) -> Result<(), RotolabelError> {
    let labels = io_yolo::read_label_list(&args.classes)?;
    let inputs = if args.input.is_dir() {
        collect_annotation_files(&args.input)?
    } else {
        vec![annotation_path(args.input)?]
    };

    for annotation in &inputs {
        let document = io_voc_xml::read_voc_xml(annotation)?;
        let image_path = label_file::resolve_image_path(annotation, &document);
        let written =
            io_yolo::write_yolo_labels(&image_path, document.size, &document.shapes, &labels)?;
        println!("Wrote {}", written.display());
    }
    println!("Exported {} file(s)", inputs.len());
    Ok(())
}

fn run_verify(args: VerifyArgs) -> Result<(), RotolabelError> {
    let input = annotation_path(args.input)?;
    let mut document = io_voc_xml::read_voc_xml(&input)?;
    document.verified = !args.unset;
    io_voc_xml::write_voc_xml(&input, &document)?;
    println!(
        "Marked {} as {}",
        input.display(),
        if document.verified {
            "verified"
        } else {
            "unverified"
        }
    );
    Ok(())
}

fn annotation_path(path: PathBuf) -> Result<PathBuf, RotolabelError> {
    if LabelFile::is_label_file(&path) {
        Ok(path)
    } else {
        Err(RotolabelError::UnsupportedExtension { path })
    }
}

fn collect_annotation_files(root: &Path) -> Result<Vec<PathBuf>, RotolabelError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|err| RotolabelError::Io(err.into()))?;
        if entry.file_type().is_file() && LabelFile::is_label_file(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}
