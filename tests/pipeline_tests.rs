//! End-to-end pipeline tests for background replacement
//!
//! Covers the observable pipeline properties: transparent inputs turn into
//! the fitted background, opaque foregrounds survive unchanged, solid
//! backgrounds are swapped out, and the fit policies behave as documented.

use bgswap::{
    apply_mask, composite_over, fit_background, AlphaMask, Background, BackgroundFit,
    BackgroundReplacer, ExtractionMode, ReplacementConfig,
};
use image::{DynamicImage, Rgba, RgbaImage};

fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}

fn replacer(background: RgbaImage, config: ReplacementConfig) -> BackgroundReplacer {
    BackgroundReplacer::new(config, &DynamicImage::ImageRgba8(background)).unwrap()
}

#[test]
fn fully_transparent_input_becomes_the_fitted_background() {
    let mut replacer = replacer(
        solid(32, 32, [10, 120, 200, 255]),
        ReplacementConfig::default(),
    );
    let input = DynamicImage::ImageRgba8(solid(10, 10, [0, 0, 0, 0]));

    let result = replacer.process_image(&input).unwrap();
    assert_eq!(result.metadata.background, Background::Transparent);
    assert_eq!(result.dimensions(), (10, 10));

    let output = result.image.to_rgba8();
    for pixel in output.pixels() {
        assert_eq!(pixel, &Rgba([10, 120, 200, 255]));
    }
}

#[test]
fn opaque_foreground_is_unaffected_by_background_choice() {
    // A fully opaque mask makes compositing the identity on the foreground
    let foreground = solid(6, 6, [130, 40, 220, 255]);
    let mask = AlphaMask::new(vec![255; 36], (6, 6));
    let extracted = apply_mask(&foreground, &mask).unwrap();

    let over_red = composite_over(&extracted, &solid(6, 6, [255, 0, 0, 255])).unwrap();
    let over_blue = composite_over(&extracted, &solid(6, 6, [0, 0, 255, 255])).unwrap();

    assert_eq!(over_red, over_blue);
    for pixel in over_red.pixels() {
        assert_eq!(pixel, &Rgba([130, 40, 220, 255]));
    }
}

#[test]
fn white_background_replaced_around_centered_shape() {
    // 100x100 white image with a centered red square, threshold 30
    let config = ReplacementConfig::builder()
        .tolerance(30)
        .softness(0)
        .build()
        .unwrap();
    let mut replacer = replacer(solid(100, 100, [0, 200, 0, 255]), config);

    let mut input = solid(100, 100, [255, 255, 255, 255]);
    for y in 40..60 {
        for x in 40..60 {
            input.put_pixel(x, y, Rgba([200, 30, 30, 255]));
        }
    }

    let result = replacer
        .process_image(&DynamicImage::ImageRgba8(input))
        .unwrap();
    match result.metadata.background {
        Background::SolidColor { color, tolerance } => {
            assert_eq!(color, [255, 255, 255]);
            assert_eq!(tolerance, 30);
        },
        Background::Transparent => panic!("expected solid-color classification"),
    }

    let output = result.image.to_rgba8();
    assert_eq!(output.get_pixel(0, 0), &Rgba([0, 200, 0, 255]), "corner replaced");
    assert_eq!(output.get_pixel(99, 99), &Rgba([0, 200, 0, 255]), "corner replaced");
    assert_eq!(output.get_pixel(50, 50), &Rgba([200, 30, 30, 255]), "shape kept");
}

#[test]
fn existing_alpha_channel_is_used_as_the_mask() {
    let mut replacer = replacer(solid(8, 8, [0, 0, 0, 255]), ReplacementConfig::default());

    // Opaque white shape on a transparent canvas; white must NOT be treated
    // as a solid background because transparency is already present.
    let mut input = solid(8, 8, [0, 0, 0, 0]);
    input.put_pixel(4, 4, Rgba([255, 255, 255, 255]));

    let result = replacer
        .process_image(&DynamicImage::ImageRgba8(input))
        .unwrap();
    let output = result.image.to_rgba8();
    assert_eq!(output.get_pixel(4, 4), &Rgba([255, 255, 255, 255]));
    assert_eq!(output.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
}

#[test]
fn cover_fit_crops_instead_of_distorting() {
    // Left half black, right half white, twice as wide as the target
    let mut background = solid(100, 50, [0, 0, 0, 255]);
    for y in 0..50 {
        for x in 50..100 {
            background.put_pixel(x, y, Rgba([255, 255, 255, 255]));
        }
    }

    let fitted = fit_background(&background, (50, 50), BackgroundFit::Cover).unwrap();
    assert_eq!(fitted.dimensions(), (50, 50));
    // Center crop keeps the middle band: half black, half white
    assert_eq!(fitted.get_pixel(5, 25)[0], 0);
    assert_eq!(fitted.get_pixel(45, 25)[0], 255);
}

#[test]
fn stretch_fit_matches_exact_dimensions() {
    let background = solid(100, 50, [7, 7, 7, 255]);
    let fitted = fit_background(&background, (30, 60), BackgroundFit::Stretch).unwrap();
    assert_eq!(fitted.dimensions(), (30, 60));
}

#[test]
fn flood_fill_keeps_interior_background_colored_pixels() {
    let config = ReplacementConfig::builder()
        .extraction(ExtractionMode::FloodFill)
        .softness(0)
        .fringe_tolerance(0)
        .build()
        .unwrap();
    let mut replacer = replacer(solid(9, 9, [0, 0, 200, 255]), config);

    // White frame, black ring, white "eye" in the middle
    let mut input = solid(9, 9, [255, 255, 255, 255]);
    for i in 2..7 {
        input.put_pixel(i, 2, Rgba([0, 0, 0, 255]));
        input.put_pixel(i, 6, Rgba([0, 0, 0, 255]));
        input.put_pixel(2, i, Rgba([0, 0, 0, 255]));
        input.put_pixel(6, i, Rgba([0, 0, 0, 255]));
    }

    let result = replacer
        .process_image(&DynamicImage::ImageRgba8(input))
        .unwrap();
    let output = result.image.to_rgba8();
    assert_eq!(output.get_pixel(0, 0), &Rgba([0, 0, 200, 255]), "border replaced");
    assert_eq!(
        output.get_pixel(4, 4),
        &Rgba([255, 255, 255, 255]),
        "interior white preserved"
    );
}

#[test]
fn soft_edge_band_blends_foreground_and_background() {
    let config = ReplacementConfig::builder()
        .tolerance(30)
        .softness(20)
        .build()
        .unwrap();
    let mut replacer = replacer(solid(10, 10, [0, 0, 0, 255]), config);

    // Mostly white with one near-white pixel inside the soft band
    // (distance 40 from white) and one far red pixel to anchor the corners
    let mut input = solid(10, 10, [255, 255, 255, 255]);
    input.put_pixel(5, 5, Rgba([215, 255, 255, 255]));
    input.put_pixel(4, 4, Rgba([200, 0, 0, 255]));

    let result = replacer
        .process_image(&DynamicImage::ImageRgba8(input))
        .unwrap();
    let stats = result.mask.statistics();
    assert_eq!(stats.partial_pixels, 1, "exactly the soft band pixel");

    let output = result.image.to_rgba8();
    let blended = output.get_pixel(5, 5);
    // Half-opacity blend of near-white over black
    assert!(blended[0] > 80 && blended[0] < 130, "soft pixel is blended: {blended:?}");
}

#[test]
fn result_save_roundtrip_produces_readable_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.png");

    let mut replacer = replacer(solid(8, 8, [50, 50, 50, 255]), ReplacementConfig::default());
    let result = replacer
        .process_image(&DynamicImage::ImageRgba8(solid(8, 8, [255, 255, 255, 255])))
        .unwrap();
    result.save_png(&path).unwrap();

    let reloaded = image::open(&path).unwrap().to_rgba8();
    assert_eq!(reloaded.dimensions(), (8, 8));
    assert_eq!(reloaded.get_pixel(0, 0), &Rgba([50, 50, 50, 255]));
}
