//! Background fitting and alpha compositing

use crate::{config::BackgroundFit, error::Result};
use image::{imageops, RgbaImage};
use tracing::debug;

/// Fit a replacement background to the target dimensions
///
/// `Cover` scales the background to fully cover the target while preserving
/// aspect ratio, then center-crops the overhang. `Stretch` resizes to the
/// exact target dimensions with nearest-neighbor sampling, matching the
/// behavior expected for pixel-art sources.
///
/// # Errors
/// Returns an invalid-configuration error for zero-sized targets or
/// backgrounds.
pub fn fit_background(
    background: &RgbaImage,
    target: (u32, u32),
    fit: BackgroundFit,
) -> Result<RgbaImage> {
    let (target_width, target_height) = target;
    let (bg_width, bg_height) = background.dimensions();

    if target_width == 0 || target_height == 0 {
        return Err(crate::error::BgSwapError::invalid_config(
            "Target dimensions must be non-zero",
        ));
    }
    if bg_width == 0 || bg_height == 0 {
        return Err(crate::error::BgSwapError::invalid_config(
            "Background dimensions must be non-zero",
        ));
    }

    if background.dimensions() == target {
        return Ok(background.clone());
    }

    let fitted = match fit {
        BackgroundFit::Stretch => imageops::resize(
            background,
            target_width,
            target_height,
            imageops::FilterType::Nearest,
        ),
        BackgroundFit::Cover => {
            let scale = (f64::from(target_width) / f64::from(bg_width))
                .max(f64::from(target_height) / f64::from(bg_height));
            let scaled_width = ((f64::from(bg_width) * scale).round() as u32).max(target_width);
            let scaled_height = ((f64::from(bg_height) * scale).round() as u32).max(target_height);

            let scaled = imageops::resize(
                background,
                scaled_width,
                scaled_height,
                imageops::FilterType::Lanczos3,
            );

            let x0 = (scaled_width - target_width) / 2;
            let y0 = (scaled_height - target_height) / 2;
            imageops::crop_imm(&scaled, x0, y0, target_width, target_height).to_image()
        },
    };

    debug!(
        from = ?(bg_width, bg_height),
        to = ?target,
        fit = %fit,
        "Background fitted"
    );
    Ok(fitted)
}

/// Alpha-blend the foreground over the background
///
/// Per pixel: `out.rgb = fg.rgb * a + bg.rgb * (1 - a)` with `a` taken from
/// the foreground alpha channel; output alpha is the larger of the two.
///
/// # Errors
/// Returns a processing error when dimensions differ.
pub fn composite_over(foreground: &RgbaImage, background: &RgbaImage) -> Result<RgbaImage> {
    if foreground.dimensions() != background.dimensions() {
        return Err(crate::error::BgSwapError::processing(format!(
            "Foreground dimensions {:?} do not match background dimensions {:?}",
            foreground.dimensions(),
            background.dimensions()
        )));
    }

    let mut output = background.clone();
    for (out, fg) in output.pixels_mut().zip(foreground.pixels()) {
        let alpha = u32::from(fg[3]);
        let inverse = 255 - alpha;
        for channel in 0..3 {
            let blended =
                (u32::from(fg[channel]) * alpha + u32::from(out[channel]) * inverse + 127) / 255;
            out[channel] = blended as u8;
        }
        out[3] = out[3].max(fg[3]);
    }
    Ok(output)
}
