//! Output format handling service

use crate::config::OutputFormat;
use image::{DynamicImage, ImageBuffer, Rgb, RgbImage};

/// Service for handling output format conversions
pub struct OutputFormatHandler;

impl OutputFormatHandler {
    /// Flatten an image to RGB over a white backdrop
    ///
    /// JPEG has no alpha channel; partially transparent pixels are blended
    /// against white so cutout edges stay clean.
    #[must_use]
    pub fn flatten_to_rgb(image: &DynamicImage) -> RgbImage {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut rgb_image = ImageBuffer::new(width, height);

        for (x, y, pixel) in rgba.enumerate_pixels() {
            let alpha = u32::from(pixel[3]);
            let inverse = 255 - alpha;
            let blend =
                |channel: u8| ((u32::from(channel) * alpha + 255 * inverse + 127) / 255) as u8;
            rgb_image.put_pixel(x, y, Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])]));
        }

        rgb_image
    }

    /// Get the appropriate file extension for a given output format
    #[must_use]
    pub fn get_extension(format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }

    /// Check if a format supports transparency (alpha channel)
    #[must_use]
    pub fn supports_transparency(format: OutputFormat) -> bool {
        match format {
            OutputFormat::Png => true,
            OutputFormat::Jpeg => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions() {
        assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Png), "png");
        assert_eq!(OutputFormatHandler::get_extension(OutputFormat::Jpeg), "jpg");
    }

    #[test]
    fn test_transparency_support() {
        assert!(OutputFormatHandler::supports_transparency(OutputFormat::Png));
        assert!(!OutputFormatHandler::supports_transparency(OutputFormat::Jpeg));
    }

    #[test]
    fn test_flatten_blends_transparent_pixels_to_white() {
        let mut rgba = image::RgbaImage::from_pixel(2, 1, image::Rgba([0, 0, 0, 255]));
        rgba.put_pixel(1, 0, image::Rgba([0, 0, 0, 0]));

        let rgb = OutputFormatHandler::flatten_to_rgb(&DynamicImage::ImageRgba8(rgba));
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(rgb.get_pixel(1, 0), &Rgb([255, 255, 255]));
    }
}
