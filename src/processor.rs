//! Unified background replacement processor
//!
//! Orchestrates the full pipeline: decode, classify, extract, fit, composite.
//! The processor owns the decoded replacement background so batch runs decode
//! it once, and keeps the last fitted background around since avatar batches
//! tend to share one size.

use crate::{
    compositor,
    config::ReplacementConfig,
    detection, mask,
    services::ImageIoService,
    types::{ProcessingMetadata, ProcessingTimings, ReplacementResult},
};
use image::{DynamicImage, GenericImageView, RgbaImage};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Main processor for background replacement operations
pub struct BackgroundReplacer {
    config: ReplacementConfig,
    background: RgbaImage,
    fitted_cache: Option<((u32, u32), RgbaImage)>,
}

impl BackgroundReplacer {
    /// Create a processor from a decoded replacement background
    ///
    /// # Errors
    /// Returns `BgSwapError::InvalidConfig` when the configuration fails
    /// validation.
    pub fn new(config: ReplacementConfig, background: &DynamicImage) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            background: background.to_rgba8(),
            fitted_cache: None,
        })
    }

    /// Create a processor, loading the replacement background from a file
    ///
    /// # Errors
    /// Propagates image loading failures and configuration errors.
    pub fn with_background_path<P: AsRef<Path>>(
        config: ReplacementConfig,
        background_path: P,
    ) -> crate::Result<Self> {
        let background = ImageIoService::load_image(background_path)?;
        Self::new(config, &background)
    }

    /// Get the active configuration
    #[must_use]
    pub fn config(&self) -> &ReplacementConfig {
        &self.config
    }

    /// Replace the background of an image file
    ///
    /// Decodes the input, runs the in-memory pipeline, and returns the
    /// composited result without writing it anywhere.
    ///
    /// # Errors
    /// * Image loading failures (file not found, invalid format, etc.)
    /// * Mask or composite dimension mismatches
    pub fn process_file<P: AsRef<Path>>(&mut self, input_path: P) -> crate::Result<ReplacementResult> {
        let input_path_str = input_path.as_ref().display().to_string();
        let decode_start = Instant::now();
        let image = ImageIoService::load_image(input_path)?;
        let decode_ms = decode_start.elapsed().as_millis() as u64;

        let mut result = self.process_image(&image)?;
        result.metadata.timings.image_decode_ms = decode_ms;
        result.metadata.timings.total_ms += decode_ms;
        result.input_path = Some(input_path_str.clone());

        info!(
            "Processed: {} ({}x{}, {}) in {}ms",
            input_path_str,
            result.original_dimensions.0,
            result.original_dimensions.1,
            result.metadata.background,
            result.metadata.timings.total_ms
        );
        Ok(result)
    }

    /// Replace the background of an in-memory image
    ///
    /// # Errors
    /// * Mask or composite dimension mismatches
    /// * Zero-sized inputs
    pub fn process_image(&mut self, image: &DynamicImage) -> crate::Result<ReplacementResult> {
        let total_start = Instant::now();
        let mut timings = ProcessingTimings::new();

        let rgba = image.to_rgba8();
        let original_dimensions = image.dimensions();

        let classify_start = Instant::now();
        let background = detection::classify_background(&rgba, &self.config);
        timings.classify_ms = classify_start.elapsed().as_millis() as u64;
        debug!(background = %background, "Background classified");

        let mask_start = Instant::now();
        let alpha_mask = mask::compute_mask(&rgba, background, &self.config);
        let foreground = mask::apply_mask(&rgba, &alpha_mask)?;
        timings.mask_ms = mask_start.elapsed().as_millis() as u64;

        let composite_start = Instant::now();
        let fitted = self.fitted_background(original_dimensions)?;
        let composited = compositor::composite_over(&foreground, &fitted)?;
        timings.composite_ms = composite_start.elapsed().as_millis() as u64;

        timings.total_ms = total_start.elapsed().as_millis() as u64;

        let mut metadata = ProcessingMetadata::new(background);
        metadata.set_timings(timings);

        Ok(ReplacementResult::new(
            DynamicImage::ImageRgba8(composited),
            alpha_mask,
            original_dimensions,
            metadata,
        ))
    }

    /// Fitted background for the given dimensions, cached for reuse
    fn fitted_background(&mut self, dimensions: (u32, u32)) -> crate::Result<RgbaImage> {
        if let Some((cached_dims, cached)) = &self.fitted_cache {
            if *cached_dims == dimensions {
                return Ok(cached.clone());
            }
        }

        let fitted = compositor::fit_background(&self.background, dimensions, self.config.fit)?;
        self.fitted_cache = Some((dimensions, fitted.clone()));
        Ok(fitted)
    }
}
