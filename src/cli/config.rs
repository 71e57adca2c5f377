//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, CliBackgroundFit, CliExtractionMode, CliOutputFormat};
use crate::config::{BackgroundFit, ExtractionMode, OutputFormat, ReplacementConfig};
use anyhow::{Context, Result};

/// Convert CLI arguments to a unified `ReplacementConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Validate CLI arguments before building the configuration
    pub(crate) fn validate_cli(cli: &Cli) -> Result<()> {
        if cli.jpeg_quality > 100 {
            anyhow::bail!("JPEG quality must be 0-100, got {}", cli.jpeg_quality);
        }
        if cli.batch && cli.input.is_file() {
            anyhow::bail!(
                "--batch expects an input folder, got a file: {}",
                cli.input.display()
            );
        }
        if !cli.batch && cli.input.is_dir() {
            anyhow::bail!(
                "Input is a folder; pass --batch to process it: {}",
                cli.input.display()
            );
        }
        Ok(())
    }

    /// Build `ReplacementConfig` from CLI arguments
    pub(crate) fn from_cli(cli: &Cli) -> Result<ReplacementConfig> {
        let output_format = match cli.format {
            CliOutputFormat::Png => OutputFormat::Png,
            CliOutputFormat::Jpeg => OutputFormat::Jpeg,
        };
        let fit = match cli.fit {
            CliBackgroundFit::Cover => BackgroundFit::Cover,
            CliBackgroundFit::Stretch => BackgroundFit::Stretch,
        };
        let extraction = match cli.extraction {
            CliExtractionMode::Threshold => ExtractionMode::Threshold,
            CliExtractionMode::FloodFill => ExtractionMode::FloodFill,
        };

        ReplacementConfig::builder()
            .tolerance(cli.tolerance)
            .softness(cli.softness)
            .fringe_tolerance(cli.fringe_tolerance)
            .extraction(extraction)
            .fit(fit)
            .output_format(output_format)
            .jpeg_quality(cli.jpeg_quality)
            .build()
            .context("Invalid configuration")
    }
}
