//! Configuration types for background replacement operations

use serde::{Deserialize, Serialize};

/// Output image format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// PNG with alpha channel transparency
    Png,
    /// JPEG (no transparency, foreground flattened over the background)
    Jpeg,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Png
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Png => write!(f, "png"),
            Self::Jpeg => write!(f, "jpeg"),
        }
    }
}

/// Policy for fitting the replacement background to the input dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackgroundFit {
    /// Scale to cover preserving aspect ratio, then center-crop
    Cover,
    /// Resize to the exact target dimensions, ignoring aspect ratio
    Stretch,
}

impl Default for BackgroundFit {
    fn default() -> Self {
        Self::Cover
    }
}

impl std::fmt::Display for BackgroundFit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cover => write!(f, "cover"),
            Self::Stretch => write!(f, "stretch"),
        }
    }
}

/// Foreground extraction strategy for solid-color backgrounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionMode {
    /// Per-pixel color distance threshold with a soft edge band
    Threshold,
    /// Flood fill from the border; interior pixels matching the background
    /// color are preserved
    FloodFill,
}

impl Default for ExtractionMode {
    fn default() -> Self {
        Self::Threshold
    }
}

impl std::fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Threshold => write!(f, "threshold"),
            Self::FloodFill => write!(f, "flood-fill"),
        }
    }
}

/// Configuration for background replacement operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplacementConfig {
    /// Color distance tolerance for background matching
    pub tolerance: u8,

    /// Width of the linear soft edge band beyond the tolerance (0 disables)
    pub softness: u8,

    /// Tolerance for the fringe cleanup pass in flood-fill mode
    pub fringe_tolerance: u8,

    /// Foreground extraction strategy
    pub extraction: ExtractionMode,

    /// Background fit policy
    pub fit: BackgroundFit,

    /// Output format
    pub output_format: OutputFormat,

    /// JPEG quality (0-100)
    pub jpeg_quality: u8,

    /// Side length of the square corner regions sampled by the classifier
    pub corner_sample: u32,

    /// Maximum color distance under which the four corners are considered to
    /// agree on a single background color
    pub corner_agreement: u8,
}

impl Default for ReplacementConfig {
    fn default() -> Self {
        Self {
            tolerance: 45,
            softness: 12,
            fringe_tolerance: 55,
            extraction: ExtractionMode::default(),
            fit: BackgroundFit::default(),
            output_format: OutputFormat::default(),
            jpeg_quality: 90,
            corner_sample: 4,
            corner_agreement: 24,
        }
    }
}

impl ReplacementConfig {
    /// Create a configuration builder
    #[must_use]
    pub fn builder() -> ReplacementConfigBuilder {
        ReplacementConfigBuilder::default()
    }

    /// Validate configuration parameters
    ///
    /// # Errors
    /// Returns `BgSwapError::InvalidConfig` describing the offending value.
    pub fn validate(&self) -> crate::Result<()> {
        if self.jpeg_quality > 100 {
            return Err(crate::error::BgSwapError::config_value_error(
                "jpeg_quality",
                self.jpeg_quality,
                "0-100",
            ));
        }
        if self.corner_sample == 0 || self.corner_sample > 64 {
            return Err(crate::error::BgSwapError::config_value_error(
                "corner_sample",
                self.corner_sample,
                "1-64",
            ));
        }
        Ok(())
    }
}

/// Builder for `ReplacementConfig`
#[derive(Debug, Default)]
pub struct ReplacementConfigBuilder {
    config: ReplacementConfig,
}

impl ReplacementConfigBuilder {
    /// Set the background matching tolerance
    #[must_use]
    pub fn tolerance(mut self, tolerance: u8) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    /// Set the soft edge band width
    #[must_use]
    pub fn softness(mut self, softness: u8) -> Self {
        self.config.softness = softness;
        self
    }

    /// Set the fringe cleanup tolerance (flood-fill mode)
    #[must_use]
    pub fn fringe_tolerance(mut self, tolerance: u8) -> Self {
        self.config.fringe_tolerance = tolerance;
        self
    }

    /// Set the extraction strategy
    #[must_use]
    pub fn extraction(mut self, mode: ExtractionMode) -> Self {
        self.config.extraction = mode;
        self
    }

    /// Set the background fit policy
    #[must_use]
    pub fn fit(mut self, fit: BackgroundFit) -> Self {
        self.config.fit = fit;
        self
    }

    /// Set the output format
    #[must_use]
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    /// Set the JPEG quality (0-100)
    #[must_use]
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality;
        self
    }

    /// Set the corner sample region size
    #[must_use]
    pub fn corner_sample(mut self, size: u32) -> Self {
        self.config.corner_sample = size;
        self
    }

    /// Set the corner agreement distance
    #[must_use]
    pub fn corner_agreement(mut self, distance: u8) -> Self {
        self.config.corner_agreement = distance;
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// Returns `BgSwapError::InvalidConfig` when a parameter is out of range.
    pub fn build(self) -> crate::Result<ReplacementConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ReplacementConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = ReplacementConfig::builder()
            .tolerance(30)
            .softness(0)
            .fit(BackgroundFit::Stretch)
            .extraction(ExtractionMode::FloodFill)
            .build()
            .unwrap();
        assert_eq!(config.tolerance, 30);
        assert_eq!(config.softness, 0);
        assert_eq!(config.fit, BackgroundFit::Stretch);
        assert_eq!(config.extraction, ExtractionMode::FloodFill);
    }

    #[test]
    fn test_invalid_jpeg_quality_rejected() {
        let result = ReplacementConfig::builder().jpeg_quality(101).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_corner_sample_rejected() {
        let result = ReplacementConfig::builder().corner_sample(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(BackgroundFit::Cover.to_string(), "cover");
        assert_eq!(ExtractionMode::FloodFill.to_string(), "flood-fill");
        assert_eq!(OutputFormat::Png.to_string(), "png");
    }
}
