//! Core types for background replacement operations

use crate::{config::OutputFormat, error::Result};
use image::{DynamicImage, GenericImageView, ImageBuffer, Luma, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Detected background of an input image
///
/// Classification happens once per image: either the image already carries
/// meaningful transparency, or a single dominant solid color was detected by
/// corner/border sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Background {
    /// Image already has an alpha channel with transparency; the existing
    /// alpha values are the mask
    Transparent,
    /// Single dominant solid background color with a matching tolerance
    SolidColor {
        /// Detected background color (RGB)
        color: [u8; 3],
        /// Color distance tolerance used for matching
        tolerance: u8,
    },
}

impl std::fmt::Display for Background {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transparent => write!(f, "transparent"),
            Self::SolidColor { color, tolerance } => write!(
                f,
                "solid rgb({}, {}, {}) tolerance {}",
                color[0], color[1], color[2], tolerance
            ),
        }
    }
}

/// Per-pixel foreground opacity mask
///
/// Stored as one byte per pixel in row-major order, 0 = background,
/// 255 = fully opaque foreground.
#[derive(Debug, Clone)]
pub struct AlphaMask {
    /// Raw mask data (width * height bytes)
    pub data: Vec<u8>,

    /// Mask dimensions (width, height)
    pub dimensions: (u32, u32),
}

impl AlphaMask {
    /// Create a new alpha mask from raw data
    #[must_use]
    pub fn new(data: Vec<u8>, dimensions: (u32, u32)) -> Self {
        Self { data, dimensions }
    }

    /// Build a mask from the alpha channel of an RGBA image
    #[must_use]
    pub fn from_alpha_channel(image: &RgbaImage) -> Self {
        let data = image.pixels().map(|p| p[3]).collect();
        Self {
            data,
            dimensions: image.dimensions(),
        }
    }

    /// Mask opacity at the given pixel, 0 when out of bounds
    #[must_use]
    pub fn value(&self, x: u32, y: u32) -> u8 {
        let (width, height) = self.dimensions;
        if x >= width || y >= height {
            return 0;
        }
        let index = (y as usize) * (width as usize) + (x as usize);
        self.data.get(index).copied().unwrap_or(0)
    }

    /// Convert the mask to a grayscale image
    pub fn to_image(&self) -> Result<ImageBuffer<Luma<u8>, Vec<u8>>> {
        let (width, height) = self.dimensions;
        ImageBuffer::from_raw(width, height, self.data.clone()).ok_or_else(|| {
            crate::error::BgSwapError::processing("Mask data does not match dimensions")
        })
    }

    /// Replace the alpha channel of an RGBA image with this mask
    ///
    /// # Errors
    /// Returns a processing error when the image dimensions do not match the
    /// mask dimensions.
    pub fn apply_to_image(&self, image: &mut RgbaImage) -> Result<()> {
        if image.dimensions() != self.dimensions {
            return Err(crate::error::BgSwapError::processing(format!(
                "Mask dimensions {:?} do not match image dimensions {:?}",
                self.dimensions,
                image.dimensions()
            )));
        }
        for (pixel, alpha) in image.pixels_mut().zip(self.data.iter()) {
            pixel[3] = *alpha;
        }
        Ok(())
    }

    /// Compute mask statistics
    #[must_use]
    pub fn statistics(&self) -> MaskStatistics {
        let total = self.data.len();
        let opaque = self.data.iter().filter(|&&a| a == 255).count();
        let transparent = self.data.iter().filter(|&&a| a == 0).count();
        MaskStatistics {
            total_pixels: total,
            opaque_pixels: opaque,
            transparent_pixels: transparent,
            partial_pixels: total - opaque - transparent,
        }
    }
}

/// Summary statistics over an alpha mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskStatistics {
    /// Total number of pixels in the mask
    pub total_pixels: usize,
    /// Pixels with full opacity (255)
    pub opaque_pixels: usize,
    /// Pixels with zero opacity
    pub transparent_pixels: usize,
    /// Pixels inside the soft edge band (0 < alpha < 255)
    pub partial_pixels: usize,
}

/// Detailed timing breakdown of a replacement operation (milliseconds)
#[derive(Debug, Clone, Default)]
pub struct ProcessingTimings {
    /// Image decode time
    pub image_decode_ms: u64,
    /// Background classification time
    pub classify_ms: u64,
    /// Mask extraction time
    pub mask_ms: u64,
    /// Background fit and composite time
    pub composite_ms: u64,
    /// Image encode time (None until the result is saved)
    pub image_encode_ms: Option<u64>,
    /// End-to-end time excluding encode
    pub total_ms: u64,
}

impl ProcessingTimings {
    /// Create empty timings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Processing metadata attached to every result
#[derive(Debug, Clone)]
pub struct ProcessingMetadata {
    /// Detected background descriptor
    pub background: Background,
    /// ISO-8601 timestamp of the operation
    pub timestamp: String,
    /// Timing breakdown
    pub timings: ProcessingTimings,
}

impl ProcessingMetadata {
    /// Create metadata for a detected background
    #[must_use]
    pub fn new(background: Background) -> Self {
        Self {
            background,
            timestamp: chrono::Utc::now().to_rfc3339(),
            timings: ProcessingTimings::new(),
        }
    }

    /// Attach detailed timings
    pub fn set_timings(&mut self, timings: ProcessingTimings) {
        self.timings = timings;
    }
}

/// Result of a background replacement operation
#[derive(Debug, Clone)]
pub struct ReplacementResult {
    /// Composited image (foreground over the new background)
    pub image: DynamicImage,

    /// The alpha mask used for compositing
    pub mask: AlphaMask,

    /// Input image dimensions
    pub original_dimensions: (u32, u32),

    /// Processing metadata
    pub metadata: ProcessingMetadata,

    /// Original input path (for logging purposes)
    pub input_path: Option<String>,
}

impl ReplacementResult {
    /// Create a new replacement result
    #[must_use]
    pub fn new(
        image: DynamicImage,
        mask: AlphaMask,
        original_dimensions: (u32, u32),
        metadata: ProcessingMetadata,
    ) -> Self {
        Self {
            image,
            mask,
            original_dimensions,
            metadata,
            input_path: None,
        }
    }

    /// Save the result as PNG with alpha channel
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.image.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    /// Save the result as JPEG (alpha dropped)
    pub fn save_jpeg<P: AsRef<Path>>(&self, path: P, quality: u8) -> Result<()> {
        let rgb_image = self.image.to_rgb8();
        let mut jpeg_encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
            std::fs::File::create(path)?,
            quality,
        );
        jpeg_encoder.encode_image(&rgb_image)?;
        Ok(())
    }

    /// Save in the specified format
    pub fn save<P: AsRef<Path>>(&self, path: P, format: OutputFormat, quality: u8) -> Result<()> {
        match format {
            OutputFormat::Png => self.save_png(path),
            OutputFormat::Jpeg => self.save_jpeg(path, quality),
        }
    }

    /// Get the image as raw RGBA bytes
    #[must_use]
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.image.to_rgba8().into_raw()
    }

    /// Get image dimensions
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Get detailed timing breakdown
    #[must_use]
    pub fn timings(&self) -> &ProcessingTimings {
        &self.metadata.timings
    }
}

/// Convenience constructor for an RGBA pixel
#[must_use]
pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Rgba<u8> {
    Rgba([r, g, b, a])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_from_alpha_channel() {
        let mut image = RgbaImage::from_pixel(2, 2, rgba(10, 20, 30, 255));
        image.put_pixel(1, 1, rgba(10, 20, 30, 0));

        let mask = AlphaMask::from_alpha_channel(&image);
        assert_eq!(mask.dimensions, (2, 2));
        assert_eq!(mask.value(0, 0), 255);
        assert_eq!(mask.value(1, 1), 0);
        assert_eq!(mask.value(5, 5), 0);
    }

    #[test]
    fn test_mask_apply_dimension_mismatch() {
        let mask = AlphaMask::new(vec![255; 4], (2, 2));
        let mut image = RgbaImage::new(3, 3);
        assert!(mask.apply_to_image(&mut image).is_err());
    }

    #[test]
    fn test_mask_statistics() {
        let mask = AlphaMask::new(vec![0, 255, 128, 255], (2, 2));
        let stats = mask.statistics();
        assert_eq!(stats.total_pixels, 4);
        assert_eq!(stats.opaque_pixels, 2);
        assert_eq!(stats.transparent_pixels, 1);
        assert_eq!(stats.partial_pixels, 1);
    }

    #[test]
    fn test_background_display() {
        let bg = Background::SolidColor {
            color: [255, 0, 128],
            tolerance: 45,
        };
        assert_eq!(bg.to_string(), "solid rgb(255, 0, 128) tolerance 45");
        assert_eq!(Background::Transparent.to_string(), "transparent");
    }
}
