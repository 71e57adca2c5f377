//! Image I/O operations service
//!
//! Separates file I/O from the pipeline logic so the processing stages stay
//! testable on in-memory buffers.

use crate::{
    config::OutputFormat,
    error::{BgSwapError, Result},
};
use image::DynamicImage;
use std::path::Path;

/// Service for handling image file input/output operations
pub struct ImageIoService;

impl ImageIoService {
    /// Load an image from a file path
    ///
    /// Tries extension-based format detection first and falls back to
    /// content-based detection for files with wrong or missing extensions.
    ///
    /// # Errors
    /// * `BgSwapError::Io` - file missing or unreadable
    /// * `BgSwapError::Image` - undecodable image data
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(BgSwapError::file_io_error(
                "read image file",
                path_ref,
                &std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
            ));
        }

        match image::open(path_ref) {
            Ok(img) => Ok(img),
            Err(e) => {
                log::debug!(
                    "Extension-based loading failed for {}: {}. Attempting content-based detection.",
                    path_ref.display(),
                    e
                );

                let data = std::fs::read(path_ref)
                    .map_err(|io_err| BgSwapError::file_io_error("read image data", path_ref, &io_err))?;

                image::load_from_memory(&data)
                    .map_err(|content_err| BgSwapError::image_load_error(path_ref, &content_err))
            },
        }
    }

    /// Save an image to a file with the specified format
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    /// * `BgSwapError::Io` - directory creation or write failures
    /// * `BgSwapError::Image` - encoding failures
    pub fn save_image<P: AsRef<Path>>(
        image: &DynamicImage,
        path: P,
        format: OutputFormat,
        jpeg_quality: u8,
    ) -> Result<()> {
        let path_ref = path.as_ref();

        if let Some(parent) = path_ref.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    BgSwapError::file_io_error("create output directory", parent, &e)
                })?;
            }
        }

        match format {
            OutputFormat::Png => {
                image.save_with_format(path_ref, image::ImageFormat::Png)?;
            },
            OutputFormat::Jpeg => {
                let rgb_image = crate::services::format::OutputFormatHandler::flatten_to_rgb(image);
                let file = std::fs::File::create(path_ref)
                    .map_err(|e| BgSwapError::file_io_error("create output file", path_ref, &e))?;
                let mut encoder =
                    image::codecs::jpeg::JpegEncoder::new_with_quality(file, jpeg_quality);
                encoder.encode_image(&rgb_image)?;
            },
        }
        Ok(())
    }
}
