//! Background classification
//!
//! Decides whether an input image already carries meaningful transparency or
//! sits on a single dominant solid background color. Solid colors are
//! estimated from the four corner regions, with a most-common-border-color
//! fallback when the corners disagree.

use crate::{config::ReplacementConfig, types::Background};
use image::RgbaImage;
use std::collections::HashMap;
use tracing::debug;

/// Euclidean distance between two RGB colors
#[must_use]
pub fn color_distance(a: [u8; 3], b: [u8; 3]) -> f32 {
    let dr = f32::from(a[0]) - f32::from(b[0]);
    let dg = f32::from(a[1]) - f32::from(b[1]);
    let db = f32::from(a[2]) - f32::from(b[2]);
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Classify the background of an input image
///
/// Any pixel with alpha below 255 marks the image as already transparent and
/// the existing alpha channel becomes the mask. Otherwise the four corner
/// regions are sampled; if they agree within `corner_agreement` the image is
/// classified as solid-color. Disagreeing corners fall back to the single most
/// common border pixel color.
#[must_use]
pub fn classify_background(image: &RgbaImage, config: &ReplacementConfig) -> Background {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Background::Transparent;
    }

    if image.pixels().any(|p| p[3] < 255) {
        let ratio = border_transparency_ratio(image);
        debug!(
            border_transparent_ratio = ratio,
            "Image has existing transparency, using alpha channel as mask"
        );
        return Background::Transparent;
    }

    let corners = corner_means(image, config.corner_sample);
    let max_spread = max_pairwise_distance(&corners);

    if max_spread <= f32::from(config.corner_agreement) {
        let color = average_color(&corners);
        debug!(
            color = ?color,
            spread = max_spread,
            "Corners agree on a solid background color"
        );
        Background::SolidColor {
            color,
            tolerance: config.tolerance,
        }
    } else {
        let color = dominant_border_color(image);
        debug!(
            color = ?color,
            spread = max_spread,
            "Corners disagree, falling back to most common border color"
        );
        Background::SolidColor {
            color,
            tolerance: config.tolerance,
        }
    }
}

/// Fraction of border pixels that are fully transparent
///
/// The reference heuristic for "already cut out" artwork; reported in logs
/// alongside the classification.
#[must_use]
pub fn border_transparency_ratio(image: &RgbaImage) -> f32 {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return 0.0;
    }

    let mut transparent = 0usize;
    let mut total = 0usize;
    for x in 0..width {
        for y in [0, height - 1] {
            total += 1;
            if image.get_pixel(x, y)[3] == 0 {
                transparent += 1;
            }
        }
    }
    for y in 0..height {
        for x in [0, width - 1] {
            total += 1;
            if image.get_pixel(x, y)[3] == 0 {
                transparent += 1;
            }
        }
    }

    transparent as f32 / total as f32
}

/// Mean color of each corner region (top-left, top-right, bottom-left,
/// bottom-right)
fn corner_means(image: &RgbaImage, sample: u32) -> [[u8; 3]; 4] {
    let (width, height) = image.dimensions();
    let sample = sample.min(width).min(height).max(1);

    let origins = [
        (0, 0),
        (width - sample, 0),
        (0, height - sample),
        (width - sample, height - sample),
    ];

    let mut means = [[0u8; 3]; 4];
    for (corner, &(x0, y0)) in origins.iter().enumerate() {
        let mut sums = [0u64; 3];
        for y in y0..y0 + sample {
            for x in x0..x0 + sample {
                let p = image.get_pixel(x, y);
                sums[0] += u64::from(p[0]);
                sums[1] += u64::from(p[1]);
                sums[2] += u64::from(p[2]);
            }
        }
        let count = u64::from(sample) * u64::from(sample);
        means[corner] = [
            (sums[0] / count) as u8,
            (sums[1] / count) as u8,
            (sums[2] / count) as u8,
        ];
    }
    means
}

fn max_pairwise_distance(colors: &[[u8; 3]; 4]) -> f32 {
    let mut max = 0.0f32;
    for i in 0..colors.len() {
        for j in i + 1..colors.len() {
            max = max.max(color_distance(colors[i], colors[j]));
        }
    }
    max
}

fn average_color(colors: &[[u8; 3]; 4]) -> [u8; 3] {
    let mut sums = [0u32; 3];
    for c in colors {
        sums[0] += u32::from(c[0]);
        sums[1] += u32::from(c[1]);
        sums[2] += u32::from(c[2]);
    }
    [
        (sums[0] / 4) as u8,
        (sums[1] / 4) as u8,
        (sums[2] / 4) as u8,
    ]
}

/// Most common color on the 1-pixel border ring
fn dominant_border_color(image: &RgbaImage) -> [u8; 3] {
    let (width, height) = image.dimensions();
    let mut counts: HashMap<[u8; 3], usize> = HashMap::new();

    let mut tally = |x: u32, y: u32| {
        let p = image.get_pixel(x, y);
        if p[3] > 0 {
            *counts.entry([p[0], p[1], p[2]]).or_insert(0) += 1;
        }
    };

    for x in 0..width {
        tally(x, 0);
        if height > 1 {
            tally(x, height - 1);
        }
    }
    for y in 1..height.saturating_sub(1) {
        tally(0, y);
        if width > 1 {
            tally(width - 1, y);
        }
    }

    counts
        .into_iter()
        .max_by_key(|&(color, count)| (count, color))
        .map_or([0, 0, 0], |(color, _)| color)
}
