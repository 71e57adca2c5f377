//! Background Replacement CLI Tool
//!
//! Command-line interface for replacing image backgrounds using the unified
//! processor: single-image mode and batch mode over a folder of PNG files.

use super::config::CliConfigBuilder;
use crate::{
    config::ReplacementConfig,
    processor::BackgroundReplacer,
    services::{ImageIoService, OutputFormatHandler},
    types::ReplacementResult,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

/// Background replacement CLI tool
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "bgswap")]
pub struct Cli {
    /// Input image file (or input folder with --batch)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Replacement background image
    #[arg(value_name = "BACKGROUND")]
    pub background: PathBuf,

    /// Output file (or output folder with --batch)
    /// [default: <stem>_output.png, or <input_folder>_output]
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Process all PNG files in the input folder
    #[arg(short, long)]
    pub batch: bool,

    /// Color distance tolerance for background matching
    #[arg(long, default_value_t = 45)]
    pub tolerance: u8,

    /// Soft edge band width beyond the tolerance (0 = hard cut)
    #[arg(long, default_value_t = 12)]
    pub softness: u8,

    /// Fringe cleanup tolerance (flood-fill extraction only)
    #[arg(long, default_value_t = 55)]
    pub fringe_tolerance: u8,

    /// Foreground extraction strategy for solid-color backgrounds
    #[arg(long, value_enum, default_value_t = CliExtractionMode::Threshold)]
    pub extraction: CliExtractionMode,

    /// Background fit policy
    #[arg(long, value_enum, default_value_t = CliBackgroundFit::Cover)]
    pub fit: CliBackgroundFit,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = CliOutputFormat::Png)]
    pub format: CliOutputFormat,

    /// JPEG quality (0-100)
    #[arg(long, default_value_t = 90)]
    pub jpeg_quality: u8,

    /// Process the input folder recursively (batch mode)
    #[arg(short, long)]
    pub recursive: bool,

    /// Filename pattern for batch processing (e.g., "wizard_*.png")
    #[arg(long)]
    pub pattern: Option<String>,

    /// Enable verbose logging (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliOutputFormat {
    Png,
    Jpeg,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliBackgroundFit {
    Cover,
    Stretch,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliExtractionMode {
    Threshold,
    FloodFill,
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose).context("Failed to initialize tracing")?;

    let processed_count = run(&cli)?;
    info!("Done ({processed_count} image(s))");
    Ok(())
}

/// Execute a parsed CLI invocation, returning the number of processed images
pub fn run(cli: &Cli) -> Result<usize> {
    // Validate CLI arguments
    CliConfigBuilder::validate_cli(cli).context("Invalid CLI arguments")?;

    // Convert CLI arguments to unified configuration
    let config = CliConfigBuilder::from_cli(cli).context("Failed to build configuration")?;

    info!("Starting background replacement");
    info!("Input: {}", cli.input.display());
    info!("Background: {}", cli.background.display());
    info!(
        "Fit: {}, extraction: {}, tolerance: {}",
        config.fit, config.extraction, config.tolerance
    );

    let mut processor = BackgroundReplacer::with_background_path(config, &cli.background)
        .context("Failed to load replacement background")?;

    let start_time = Instant::now();
    let processed_count = if cli.batch {
        process_batch(cli, &mut processor)?
    } else {
        process_single(cli, &mut processor)?;
        1
    };

    let total_time = start_time.elapsed();
    info!(
        "Processed {} image(s) in {:.2}s",
        processed_count,
        total_time.as_secs_f64()
    );

    Ok(processed_count)
}

/// Initialize tracing based on verbosity level
fn init_tracing(verbose_count: u8) -> Result<()> {
    use crate::tracing_config::{TracingConfig, TracingFormat};

    TracingConfig::new()
        .with_verbosity(verbose_count)
        .with_format(TracingFormat::Console)
        .init()
        .context("Failed to initialize tracing subscriber")
}

/// Process one input file and save the result
fn process_single(cli: &Cli, processor: &mut BackgroundReplacer) -> Result<()> {
    let output_path = cli.output.clone().unwrap_or_else(|| {
        generate_output_path(&cli.input, processor.config().output_format)
    });

    let result = processor
        .process_file(&cli.input)
        .with_context(|| format!("Failed to process {}", cli.input.display()))?;
    save_result(&result, &output_path, processor.config())?;

    info!("Saved: {}", output_path.display());
    Ok(())
}

/// Process every PNG file in the input folder
///
/// Failing files are reported and skipped; the rest of the batch continues.
fn process_batch(cli: &Cli, processor: &mut BackgroundReplacer) -> Result<usize> {
    if !cli.input.is_dir() {
        anyhow::bail!(
            "Input folder does not exist or is not a directory: {}",
            cli.input.display()
        );
    }

    let mut files = find_png_files(&cli.input, cli.recursive, cli.pattern.as_deref())?;
    files.retain(|file| !is_same_file(file, &cli.background));
    files.sort();

    if files.is_empty() {
        warn!("No PNG files found in {}", cli.input.display());
        return Ok(0);
    }
    info!("Found {} PNG file(s) to process", files.len());

    let output_dir = cli
        .output
        .clone()
        .unwrap_or_else(|| default_batch_output_dir(&cli.input));
    if output_dir.is_file() {
        anyhow::bail!(
            "Output path exists and is a file, not a directory: {}",
            output_dir.display()
        );
    }
    std::fs::create_dir_all(&output_dir).with_context(|| {
        format!("Failed to create output directory: {}", output_dir.display())
    })?;

    let progress = if files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap()
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut processed_count = 0usize;
    let mut failed_count = 0usize;
    let batch_start_time = Instant::now();

    for input_file in &files {
        if let Some(pb) = &progress {
            pb.set_message(format!("Processing {}", input_file.display()));
        }

        let output_path =
            generate_output_path_with_dir(input_file, &output_dir, processor.config().output_format);

        match process_and_save(processor, input_file, &output_path) {
            Ok(()) => {
                processed_count += 1;
                debug!(file = %input_file.display(), "Processed");
            },
            Err(e) => {
                error!("Failed to process {}: {}", input_file.display(), e);
                failed_count += 1;
            },
        }

        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_with_message(format!(
            "Completed! Processed: {processed_count}, Failed: {failed_count}"
        ));
    }

    if failed_count > 0 {
        warn!("Some files failed to process. Processed: {processed_count}, Failed: {failed_count}");
    }

    let batch_total_time = batch_start_time.elapsed();
    info!("Batch processing summary:");
    info!("  files processed: {processed_count}");
    info!("  files failed: {failed_count}");
    info!("  total time: {:.2}s", batch_total_time.as_secs_f64());

    Ok(processed_count)
}

fn process_and_save(
    processor: &mut BackgroundReplacer,
    input_path: &Path,
    output_path: &Path,
) -> Result<()> {
    let result = processor.process_file(input_path)?;
    save_result(&result, output_path, processor.config())
}

fn save_result(
    result: &ReplacementResult,
    output_path: &Path,
    config: &ReplacementConfig,
) -> Result<()> {
    let encode_start = Instant::now();
    ImageIoService::save_image(
        &result.image,
        output_path,
        config.output_format,
        config.jpeg_quality,
    )
    .with_context(|| format!("Failed to save output to {}", output_path.display()))?;
    debug!(
        file = %output_path.display(),
        encode_ms = encode_start.elapsed().as_millis() as u64,
        "Output encoded"
    );
    Ok(())
}

/// Find all PNG files in a directory
fn find_png_files(dir: &Path, recursive: bool, pattern: Option<&str>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if recursive {
        for entry in walkdir::WalkDir::new(dir) {
            let entry = entry?;
            if entry.file_type().is_file() {
                let path = entry.path();
                if is_png_file(path) && matches_pattern(path, pattern) {
                    files.push(path.to_path_buf());
                }
            }
        }
    } else {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                let path = entry.path();
                if is_png_file(&path) && matches_pattern(&path, pattern) {
                    files.push(path);
                }
            }
        }
    }

    Ok(files)
}

/// Check if file is a PNG based on extension
fn is_png_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}

/// Check if file matches the given pattern
fn matches_pattern(path: &Path, pattern: Option<&str>) -> bool {
    match pattern {
        Some(pat) => {
            if let Some(filename) = path.file_name().and_then(|n| n.to_str()) {
                glob::Pattern::new(pat)
                    .map(|p| p.matches(filename))
                    .unwrap_or(false)
            } else {
                false
            }
        },
        None => true,
    }
}

/// Two paths refer to the same file (used to skip the background image when
/// it lives inside the input folder)
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Generate the default output path next to the input file
fn generate_output_path(input_path: &Path, format: crate::OutputFormat) -> PathBuf {
    let stem = input_path.file_stem().unwrap_or_default();
    let dir = input_path.parent().unwrap_or(Path::new("."));
    let extension = OutputFormatHandler::get_extension(format);

    dir.join(format!("{}_output.{}", stem.to_string_lossy(), extension))
}

/// Generate an output path inside the batch output directory
fn generate_output_path_with_dir(
    input_path: &Path,
    output_dir: &Path,
    format: crate::OutputFormat,
) -> PathBuf {
    let stem = input_path.file_stem().unwrap_or_default();
    let extension = OutputFormatHandler::get_extension(format);

    output_dir.join(format!("{}_output.{}", stem.to_string_lossy(), extension))
}

/// Default batch output directory: sibling of the input folder with an
/// `_output` suffix
fn default_batch_output_dir(input_dir: &Path) -> PathBuf {
    match input_dir.file_name() {
        Some(name) => input_dir.with_file_name(format!("{}_output", name.to_string_lossy())),
        None => input_dir.join("output"),
    }
}
