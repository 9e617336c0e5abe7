//! Vocyolo: Pascal VOC XML ↔ YOLO TXT annotation converter.
//!
//! Vocyolo converts one image's object-detection annotations between the
//! nested Pascal VOC XML format (absolute pixel boxes) and the line-oriented
//! YOLO TXT format (normalized center/size boxes). Both converters pass
//! through the same in-memory [`model::AnnotationSet`], so any of the four
//! parse/write combinations works, including same-format round-trips.
//!
//! # Modules
//!
//! - [`model`]: the pivot types (AnnotationSet, BoxRecord, BoundingBox)
//! - [`voc`]: Pascal VOC XML parse/write
//! - [`yolo`]: YOLO TXT parse/write
//! - [`vocab`]: label vocabulary loading (classes.txt, data.yaml)
//! - [`error`]: error types for vocyolo operations

pub mod error;
pub mod model;
pub mod voc;
pub mod vocab;
pub mod yolo;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

pub use error::ConvertError;
use model::AnnotationSet;
use vocab::Vocabulary;
use yolo::YoloWriteOptions;

/// The vocyolo CLI application.
#[derive(Parser)]
#[command(name = "vocyolo")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert one annotation file between VOC XML and YOLO TXT.
    Convert(ConvertArgs),
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// Input annotation file.
    input: PathBuf,

    /// Output annotation file.
    output: PathBuf,

    /// Input format ('voc' or 'yolo').
    #[arg(long)]
    from: String,

    /// Output format ('voc' or 'yolo').
    #[arg(long)]
    to: String,

    /// Label vocabulary file (classes.txt or data.yaml); required whenever
    /// one side is yolo.
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Image width in pixels; required when reading yolo.
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels; required when reading yolo.
    #[arg(long)]
    height: Option<u32>,

    /// Image channel count used when reading yolo.
    #[arg(long, default_value_t = 3)]
    depth: u32,

    /// Write yolo centers with the historical min-biased formula instead of
    /// the true box midpoint.
    #[arg(long)]
    compat_center: bool,

    /// Fail on boxes whose corners are not properly ordered (default: pass
    /// them through unchanged).
    #[arg(long)]
    strict_geometry: bool,
}

/// Run the vocyolo CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), ConvertError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert(args)) => run_convert(args),
        None => {
            println!("vocyolo {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Pascal VOC XML / YOLO TXT annotation converter.");
            println!();
            println!("Run 'vocyolo --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the convert subcommand.
fn run_convert(args: ConvertArgs) -> Result<(), ConvertError> {
    let vocabulary = match args.labels.as_deref() {
        Some(path) => Some(Vocabulary::load(path)?),
        None => None,
    };

    let set = match args.from.as_str() {
        "voc" => voc::parse_voc(&args.input)?,
        "yolo" => {
            let vocabulary = vocabulary.as_ref().ok_or_else(|| {
                ConvertError::UnsupportedFormat(
                    "reading yolo requires --labels".to_string(),
                )
            })?;
            let (width, height) = match (args.width, args.height) {
                (Some(width), Some(height)) => (width, height),
                _ => {
                    return Err(ConvertError::UnsupportedFormat(
                        "reading yolo requires --width and --height".to_string(),
                    ))
                }
            };
            yolo::parse_yolo(&args.input, vocabulary.names(), width, height, args.depth)?
        }
        other => {
            return Err(ConvertError::UnsupportedFormat(format!(
                "'{}' (supported: voc, yolo)",
                other
            )));
        }
    };

    if args.strict_geometry {
        check_geometry(&set, &args.input)?;
    }

    match args.to.as_str() {
        "voc" => voc::write_voc(&args.output, &set)?,
        "yolo" => {
            let vocabulary = vocabulary.as_ref().ok_or_else(|| {
                ConvertError::UnsupportedFormat(
                    "writing yolo requires --labels".to_string(),
                )
            })?;
            let options = YoloWriteOptions {
                compat_center: args.compat_center,
            };
            yolo::write_yolo(&args.output, &set, &vocabulary.index_map(), &options)?;
        }
        other => {
            return Err(ConvertError::UnsupportedFormat(format!(
                "'{}' (supported: voc, yolo)",
                other
            )));
        }
    }

    Ok(())
}

/// Opt-in geometry check: inverted boxes are otherwise passed through.
fn check_geometry(set: &AnnotationSet, path: &Path) -> Result<(), ConvertError> {
    for (index, record) in set.boxes.iter().enumerate() {
        if !record.bounds.is_ordered() {
            return Err(ConvertError::InvalidGeometry {
                path: path.to_path_buf(),
                message: format!(
                    "box {} ('{}') has inverted corners ({}, {}, {}, {})",
                    index + 1,
                    record.class_name,
                    record.bounds.xmin,
                    record.bounds.ymin,
                    record.bounds.xmax,
                    record.bounds.ymax
                ),
            });
        }
    }
    Ok(())
}
