//! Promotional cover-art composites.
//!
//! Thin glue over the `image` crate: resize covers proportionally, lay them
//! out into a header strip, a bordered Twitter banner, or a randomized
//! social card, and write JPEG output. Layout constants mirror the house
//! style of the published lists.

use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Pixel, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::Result;

/// Cover height for strip-style composites.
pub const COVER_HEIGHT: u32 = 480;
/// Border around covers in the Twitter banner.
pub const BORDER_WIDTH: u32 = 10;
/// House background color.
pub const BACKGROUND: Rgba<u8> = Rgba([39, 46, 111, 255]);
/// Translucent tint laid over the logo column of a social card.
pub const OVERLAY: Rgba<u8> = Rgba([39, 46, 111, 220]);

/// Social card dimensions (Open Graph image size).
pub const CARD_WIDTH: u32 = 1200;
pub const CARD_HEIGHT: u32 = 630;
/// Cover width within a social card: four covers across.
pub const CARD_COVER_WIDTH: u32 = CARD_WIDTH / 4;

/// Load covers and resize each to `COVER_HEIGHT`, preserving aspect ratio.
pub fn load_covers<P: AsRef<Path>>(paths: &[P], filter: FilterType) -> Result<Vec<RgbaImage>> {
    let mut covers = Vec::with_capacity(paths.len());
    for path in paths {
        let img = image::open(path)?.to_rgba8();
        let width = scaled(img.width(), img.height(), COVER_HEIGHT);
        covers.push(imageops::resize(&img, width, COVER_HEIGHT, filter));
    }
    Ok(covers)
}

/// Load covers and resize each to `CARD_COVER_WIDTH`, preserving aspect
/// ratio (social cards stack covers vertically, so width is fixed).
pub fn load_card_covers<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<RgbaImage>> {
    let mut covers = Vec::with_capacity(paths.len());
    for path in paths {
        let img = image::open(path)?.to_rgba8();
        let height = scaled(img.height(), img.width(), CARD_COVER_WIDTH);
        covers.push(imageops::resize(
            &img,
            CARD_COVER_WIDTH,
            height,
            FilterType::Lanczos3,
        ));
    }
    Ok(covers)
}

fn scaled(side: u32, other: u32, target_other: u32) -> u32 {
    let scaled = (target_other as f32 * side as f32 / other as f32) as u32;
    scaled.max(1)
}

/// Covers side by side on a transparent ground.
pub fn header_strip(covers: &[RgbaImage]) -> RgbaImage {
    let width: u32 = covers.iter().map(|c| c.width()).sum();
    let mut strip = RgbaImage::from_pixel(width.max(1), COVER_HEIGHT, Rgba([0, 0, 0, 0]));

    let mut x: i64 = 0;
    for cover in covers {
        imageops::overlay(&mut strip, cover, x, 0);
        x += cover.width() as i64;
    }
    strip
}

/// Covers side by side with a border on the house background.
pub fn twitter_banner(covers: &[RgbaImage]) -> RgbaImage {
    let width: u32 =
        BORDER_WIDTH + covers.iter().map(|c| c.width() + BORDER_WIDTH).sum::<u32>();
    let height = COVER_HEIGHT + 2 * BORDER_WIDTH;
    let mut banner = RgbaImage::from_pixel(width, height, BACKGROUND);

    let mut x: i64 = BORDER_WIDTH as i64;
    for cover in covers {
        imageops::overlay(&mut banner, cover, x, BORDER_WIDTH as i64);
        x += (cover.width() + BORDER_WIDTH) as i64;
    }
    banner
}

/// A 1200x630 social card: shuffled covers tiled as vertical strips at
/// staggered offsets, one column tinted and stamped with the logo, the
/// whole canvas rotated by a small random angle and center-cropped.
pub fn social_card<R: Rng>(
    covers: &mut [RgbaImage],
    logo: Option<&RgbaImage>,
    rng: &mut R,
) -> RgbaImage {
    covers.shuffle(rng);
    let strip = cover_strip(covers);

    let canvas_width = CARD_WIDTH + 2 * CARD_COVER_WIDTH;
    let canvas_height = (strip.height() * 2).max(CARD_HEIGHT);
    let mut canvas = RgbaImage::from_pixel(canvas_width, canvas_height, BACKGROUND);

    let centered = (canvas_height - strip.height()) / 2;
    let mut multipliers = [0.0f32, 0.5, 1.0, 1.5];
    multipliers.shuffle(rng);

    let columns = (canvas_width / CARD_COVER_WIDTH) as usize;
    for column in 0..columns {
        let multiplier = multipliers[column % multipliers.len()];
        let x = (column as u32 * CARD_COVER_WIDTH) as i64;
        let y = (centered as f32 * multiplier) as i64;
        imageops::overlay(&mut canvas, &strip, x, y);

        // The top-aligned column carries the tint and the logo.
        if multiplier == 0.0 {
            tint_region(
                &mut canvas,
                x as u32,
                0,
                CARD_COVER_WIDTH,
                strip.height(),
                OVERLAY,
            );
            if let Some(logo) = logo {
                imageops::overlay(&mut canvas, logo, x, strip.height() as i64);
            }
        }
    }

    let degrees = rng.gen_range(-4..4) * 5;
    let rotated = rotate_about_center(
        &canvas,
        (degrees as f32).to_radians(),
        Interpolation::Bilinear,
        BACKGROUND,
    );

    let left = (rotated.width() - CARD_WIDTH) / 2;
    let top = (rotated.height() - CARD_HEIGHT) / 2;
    imageops::crop_imm(&rotated, left, top, CARD_WIDTH, CARD_HEIGHT).to_image()
}

/// Covers stacked vertically on the house background.
fn cover_strip(covers: &[RgbaImage]) -> RgbaImage {
    let height: u32 = covers.iter().map(|c| c.height()).sum();
    let mut strip = RgbaImage::from_pixel(CARD_COVER_WIDTH, height.max(1), BACKGROUND);

    let mut y: i64 = 0;
    for cover in covers {
        imageops::overlay(&mut strip, cover, 0, y);
        y += cover.height() as i64;
    }
    strip
}

fn tint_region(img: &mut RgbaImage, x: u32, y: u32, width: u32, height: u32, color: Rgba<u8>) {
    let x_end = (x + width).min(img.width());
    let y_end = (y + height).min(img.height());
    for yy in y..y_end {
        for xx in x..x_end {
            img.get_pixel_mut(xx, yy).blend(&color);
        }
    }
}

/// Write an image as JPEG at the given quality, creating parent directories
/// as needed. Alpha is discarded; JPEG has no alpha channel.
pub fn save_jpeg(img: &RgbaImage, path: &Path, quality: u8) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let rgb = DynamicImage::ImageRgba8(img.clone()).to_rgb8();
    let writer = BufWriter::new(File::create(path)?);
    let encoder = JpegEncoder::new_with_quality(writer, quality);
    rgb.write_with_encoder(encoder)?;
    Ok(())
}
