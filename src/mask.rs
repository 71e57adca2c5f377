//! Foreground extraction
//!
//! Turns a background descriptor into a per-pixel alpha mask. Images that are
//! already transparent pass their alpha channel through unchanged. Solid-color
//! backgrounds are removed either by a per-pixel distance threshold with a
//! linear soft band, or by a border flood fill that preserves interior pixels
//! matching the background color.

use crate::{
    config::{ExtractionMode, ReplacementConfig},
    detection::color_distance,
    error::Result,
    types::{AlphaMask, Background},
};
use image::RgbaImage;
use std::collections::VecDeque;
use tracing::debug;

/// Distance under which a pixel is always treated as background fringe
const FRINGE_HARD_CUTOFF: f32 = 40.0;

/// Compute the foreground alpha mask for a classified image
#[must_use]
pub fn compute_mask(
    image: &RgbaImage,
    background: Background,
    config: &ReplacementConfig,
) -> AlphaMask {
    match background {
        Background::Transparent => AlphaMask::from_alpha_channel(image),
        Background::SolidColor { color, tolerance } => match config.extraction {
            ExtractionMode::Threshold => {
                threshold_mask(image, color, tolerance, config.softness)
            },
            ExtractionMode::FloodFill => {
                flood_fill_mask(image, color, tolerance, config.fringe_tolerance)
            },
        },
    }
}

/// Apply a mask to an image, producing the extracted foreground
///
/// Pixels that end up fully transparent are zeroed so no background color
/// bleeds through premultiplied consumers.
///
/// # Errors
/// Returns a processing error when mask and image dimensions differ.
pub fn apply_mask(image: &RgbaImage, mask: &AlphaMask) -> Result<RgbaImage> {
    let mut foreground = image.clone();
    mask.apply_to_image(&mut foreground)?;
    for pixel in foreground.pixels_mut() {
        if pixel[3] == 0 {
            pixel[0] = 0;
            pixel[1] = 0;
            pixel[2] = 0;
        }
    }
    Ok(foreground)
}

/// Per-pixel distance threshold with a linear soft band
///
/// Distances at or below the tolerance are fully transparent, distances beyond
/// tolerance + softness fully opaque, with a linear ramp in between.
fn threshold_mask(image: &RgbaImage, color: [u8; 3], tolerance: u8, softness: u8) -> AlphaMask {
    let tolerance = f32::from(tolerance);
    let softness = f32::from(softness);

    let data = image
        .pixels()
        .map(|p| {
            let distance = color_distance([p[0], p[1], p[2]], color);
            let computed = if distance <= tolerance {
                0
            } else if softness > 0.0 && distance < tolerance + softness {
                (((distance - tolerance) / softness) * 255.0).round() as u8
            } else {
                255
            };
            // Never resurrect pixels the input already made transparent
            computed.min(p[3])
        })
        .collect();

    let mask = AlphaMask::new(data, image.dimensions());
    let stats = mask.statistics();
    debug!(
        transparent = stats.transparent_pixels,
        partial = stats.partial_pixels,
        "Threshold mask computed"
    );
    mask
}

/// Border flood fill with a single fringe cleanup pass
///
/// Only the background region connected to the image border is cleared, so
/// interior pixels that merely match the background color (eyes, highlights)
/// survive. The fringe pass clears anti-aliased edge pixels contaminated by
/// the background color while sparing dark outline pixels.
fn flood_fill_mask(
    image: &RgbaImage,
    color: [u8; 3],
    tolerance: u8,
    fringe_tolerance: u8,
) -> AlphaMask {
    let (width, height) = image.dimensions();
    let tolerance = f32::from(tolerance);
    let len = (width as usize) * (height as usize);

    let matches = |x: u32, y: u32| {
        let p = image.get_pixel(x, y);
        p[3] > 0 && color_distance([p[0], p[1], p[2]], color) < tolerance
    };

    let mut cleared = vec![false; len];
    let index = |x: u32, y: u32| (y as usize) * (width as usize) + (x as usize);

    let mut queue = VecDeque::new();
    for x in 0..width {
        for y in [0, height.saturating_sub(1)] {
            if matches(x, y) {
                queue.push_back((x, y));
            }
        }
    }
    for y in 0..height {
        for x in [0, width.saturating_sub(1)] {
            if matches(x, y) {
                queue.push_back((x, y));
            }
        }
    }

    while let Some((x, y)) = queue.pop_front() {
        let i = index(x, y);
        if cleared[i] || !matches(x, y) {
            continue;
        }
        cleared[i] = true;

        if x > 0 {
            queue.push_back((x - 1, y));
        }
        if x + 1 < width {
            queue.push_back((x + 1, y));
        }
        if y > 0 {
            queue.push_back((x, y - 1));
        }
        if y + 1 < height {
            queue.push_back((x, y + 1));
        }
    }

    let region_pixels = cleared.iter().filter(|&&c| c).count();

    // Tolerance 0 disables fringe cleanup
    let fringe = if fringe_tolerance == 0 {
        Vec::new()
    } else {
        fringe_pass(image, &cleared, color, fringe_tolerance)
    };
    for i in &fringe {
        cleared[*i] = true;
    }

    debug!(
        region = region_pixels,
        fringe = fringe.len(),
        "Flood fill mask computed"
    );

    let data = image
        .pixels()
        .zip(cleared.iter())
        .map(|(p, &is_cleared)| if is_cleared { 0 } else { p[3] })
        .collect();
    AlphaMask::new(data, (width, height))
}

/// Collect fringe pixels bordering the cleared background region
///
/// One neighbor pass is enough for hard-edged avatar art.
fn fringe_pass(
    image: &RgbaImage,
    cleared: &[bool],
    color: [u8; 3],
    fringe_tolerance: u8,
) -> Vec<usize> {
    let (width, height) = image.dimensions();
    let index = |x: u32, y: u32| (y as usize) * (width as usize) + (x as usize);

    let mut fringe = Vec::new();
    for y in 0..height {
        for x in 0..width {
            if !cleared[index(x, y)] {
                continue;
            }
            for (dx, dy) in [
                (-1i64, -1i64),
                (-1, 0),
                (-1, 1),
                (0, -1),
                (0, 1),
                (1, -1),
                (1, 0),
                (1, 1),
            ] {
                let nx = i64::from(x) + dx;
                let ny = i64::from(y) + dy;
                if nx < 0 || ny < 0 || nx >= i64::from(width) || ny >= i64::from(height) {
                    continue;
                }
                let (nx, ny) = (nx as u32, ny as u32);
                if !cleared[index(nx, ny)] && is_fringe_pixel(image, nx, ny, color, fringe_tolerance)
                {
                    fringe.push(index(nx, ny));
                }
            }
        }
    }
    fringe
}

/// Edge pixel contaminated by the background color
///
/// Close color match always counts; a moderate match counts only for
/// saturated, reasonably bright pixels so dark outlines are kept.
fn is_fringe_pixel(
    image: &RgbaImage,
    x: u32,
    y: u32,
    background: [u8; 3],
    fringe_tolerance: u8,
) -> bool {
    let p = image.get_pixel(x, y);
    if p[3] == 0 {
        return false;
    }

    let distance = color_distance([p[0], p[1], p[2]], background);
    if distance < FRINGE_HARD_CUTOFF {
        return true;
    }
    if distance >= f32::from(fringe_tolerance) {
        return false;
    }

    let (lightness, saturation) = lightness_saturation([p[0], p[1], p[2]]);
    saturation > 0.25 && lightness > 0.2
}

/// HSL lightness and saturation of an RGB color, both in [0, 1]
fn lightness_saturation(rgb: [u8; 3]) -> (f32, f32) {
    let r = f32::from(rgb[0]) / 255.0;
    let g = f32::from(rgb[1]) / 255.0;
    let b = f32::from(rgb[2]) / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let lightness = (max + min) / 2.0;
    let saturation = if max <= min {
        0.0
    } else {
        (max - min) / (1.0 - (2.0 * lightness - 1.0).abs()).max(f32::EPSILON)
    };
    (lightness, saturation)
}
