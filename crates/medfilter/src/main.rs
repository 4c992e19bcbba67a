//! medfilter: filter one image and bundle every variant into a ZIP.
//!
//! Applies any combination of box blur, median blur, Gaussian blur and
//! Canny edge detection to the input image, each against the untouched
//! original. Prints one caption per result and writes
//! `processed_images.zip` containing the original plus every filtered
//! variant as PNG.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin medfilter -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use medfilter_export::{ARCHIVE_FILE_NAME, ARCHIVE_MIME_TYPE, export_archive};
use medfilter_pipeline::{FilterSelection, decode, run_parallel};

/// Apply smoothing filters and Canny edge detection to an image.
///
/// Every enabled filter runs on the original image; the results are
/// written, together with the original, to a single ZIP archive.
#[derive(Parser)]
#[command(name = "medfilter", version)]
struct Cli {
    /// Path to the input image (PNG or JPEG).
    image_path: PathBuf,

    /// Directory to write the archive into.
    #[arg(long, short, default_value = ".")]
    output: PathBuf,

    /// Apply a box blur.
    #[arg(long)]
    box_blur: bool,

    /// Box blur kernel size (odd, 3-29).
    #[arg(long, default_value_t = FilterSelection::DEFAULT_KERNEL_SIZE)]
    box_kernel_size: u32,

    /// Apply a median blur.
    #[arg(long)]
    median_blur: bool,

    /// Median blur kernel size (odd, 3-29).
    #[arg(long, default_value_t = FilterSelection::DEFAULT_KERNEL_SIZE)]
    median_kernel_size: u32,

    /// Apply a Gaussian blur.
    #[arg(long)]
    gaussian_blur: bool,

    /// Gaussian kernel size (odd, 3-21).
    #[arg(long, default_value_t = FilterSelection::DEFAULT_KERNEL_SIZE)]
    gaussian_kernel_size: u32,

    /// Gaussian sigma (0.1-10.0).
    #[arg(long, default_value_t = FilterSelection::DEFAULT_GAUSSIAN_SIGMA)]
    gaussian_sigma: f32,

    /// Apply Canny edge detection.
    #[arg(long)]
    canny: bool,

    /// Canny low threshold (0-255).
    #[arg(long, default_value_t = FilterSelection::DEFAULT_CANNY_LOW)]
    canny_low: i32,

    /// Canny high threshold (0-255).
    #[arg(long, default_value_t = FilterSelection::DEFAULT_CANNY_HIGH)]
    canny_high: i32,

    /// Enable every filter.
    #[arg(long)]
    all: bool,

    /// Full filter selection as a JSON string.
    ///
    /// When provided, all other filter flags are ignored. Missing fields
    /// take their defaults.
    #[arg(long)]
    selection_json: Option<String>,

    /// Log at debug level (per-filter timings).
    #[arg(long, short)]
    verbose: bool,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,
}

fn selection_from_cli(cli: &Cli) -> Result<FilterSelection, String> {
    if let Some(ref json) = cli.selection_json {
        return serde_json::from_str(json)
            .map_err(|e| format!("Error parsing --selection-json: {e}"));
    }

    Ok(FilterSelection {
        enable_box_blur: cli.all || cli.box_blur,
        box_kernel_size: cli.box_kernel_size,
        enable_median_blur: cli.all || cli.median_blur,
        median_kernel_size: cli.median_kernel_size,
        enable_gaussian_blur: cli.all || cli.gaussian_blur,
        gaussian_kernel_size: cli.gaussian_kernel_size,
        gaussian_sigma: cli.gaussian_sigma,
        enable_canny: cli.all || cli.canny,
        canny_low: cli.canny_low,
        canny_high: cli.canny_high,
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);

    let selection = match selection_from_cli(&cli) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let specs = match selection.to_specs() {
        Ok(specs) => specs,
        Err(e) => {
            eprintln!("Invalid selection: {e}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        path = %cli.image_path.display(),
        bytes = image_bytes.len(),
        filters = specs.len(),
        "loaded image",
    );

    let original = match decode(&image_bytes) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Error decoding {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    let results = match run_parallel(&original, &specs) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Pipeline error: {e}");
            return ExitCode::FAILURE;
        }
    };
    for result in &results {
        println!("{}", result.caption());
    }

    let archive = match export_archive(&results) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Export error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let archive_path = cli.output.join(ARCHIVE_FILE_NAME);
    if let Err(e) = std::fs::write(&archive_path, &archive) {
        eprintln!("Error writing {}: {e}", archive_path.display());
        return ExitCode::FAILURE;
    }
    tracing::info!(
        path = %archive_path.display(),
        bytes = archive.len(),
        mime = ARCHIVE_MIME_TYPE,
        "archive saved",
    );
    println!("{}", archive_path.display());

    ExitCode::SUCCESS
}
