#![allow(clippy::uninlined_format_args)]

//! # bgswap
//!
//! Background replacement for small character and avatar images: detect an
//! existing transparent or solid-color background, extract the foreground,
//! and composite it onto a new background image.
//!
//! The pipeline is a single synchronous pass per image:
//!
//! 1. **Load** the input into an RGBA buffer
//! 2. **Classify** the background (`Transparent` vs `SolidColor`)
//! 3. **Extract** the foreground alpha mask (existing alpha, distance
//!    threshold with a soft edge band, or border flood fill)
//! 4. **Composite** the foreground over the fitted replacement background
//! 5. **Write** the result
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bgswap::{BackgroundReplacer, ReplacementConfig};
//!
//! # fn example() -> bgswap::Result<()> {
//! let config = ReplacementConfig::builder().tolerance(30).build()?;
//! let mut replacer = BackgroundReplacer::with_background_path(config, "pink_pattern.png")?;
//!
//! let result = replacer.process_file("wizard.png")?;
//! result.save_png("wizard_output.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Library vs CLI Usage
//!
//! All processing functionality is available by default; enable the `cli`
//! feature (on by default) for the `bgswap` command-line tool with batch
//! support and progress reporting.

#[cfg(feature = "cli")]
pub mod cli;
pub mod compositor;
pub mod config;
pub mod detection;
pub mod error;
pub mod mask;
pub mod processor;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;

pub use compositor::{composite_over, fit_background};
pub use config::{
    BackgroundFit, ExtractionMode, OutputFormat, ReplacementConfig, ReplacementConfigBuilder,
};
pub use detection::classify_background;
pub use error::{BgSwapError, Result};
pub use mask::{apply_mask, compute_mask};
pub use processor::BackgroundReplacer;
pub use types::{AlphaMask, Background, ReplacementResult};

use std::path::Path;

/// Replace the background of a single image file
///
/// Convenience wrapper that loads the replacement background, runs the full
/// pipeline, and returns the composited result. For batches, construct a
/// [`BackgroundReplacer`] once and reuse it so the background is decoded and
/// fitted a single time.
///
/// # Errors
/// Propagates image loading, configuration, and processing failures.
pub fn replace_background<P: AsRef<Path>, Q: AsRef<Path>>(
    input_path: P,
    background_path: Q,
    config: &ReplacementConfig,
) -> Result<ReplacementResult> {
    let mut replacer = BackgroundReplacer::with_background_path(config.clone(), background_path)?;
    replacer.process_file(input_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};

    #[test]
    fn test_replace_background_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("input.png");
        let background_path = dir.path().join("background.png");

        let input = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
        DynamicImage::ImageRgba8(input).save(&input_path).unwrap();
        let background = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 255, 255]));
        DynamicImage::ImageRgba8(background)
            .save(&background_path)
            .unwrap();

        let result =
            replace_background(&input_path, &background_path, &ReplacementConfig::default())
                .unwrap();
        // Uniform white input is all background, so the output is the new one
        assert_eq!(
            result.image.to_rgba8().get_pixel(4, 4),
            &Rgba([0, 0, 255, 255])
        );
    }
}
