//! Color to grayscale conversion.
//!
//! Uses the standard luma weights `0.299*R + 0.587*G + 0.114*B`, rounded
//! to the nearest integer. The Canny detector runs on this output.

use image::{GrayImage, Luma};

use crate::types::{Channels, ImageBuffer};

/// Luma of one RGB pixel, rounded half-up.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    // Max numerator is 255_500, so the quotient never exceeds 255.
    ((299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b) + 500) / 1000) as u8
}

/// Convert to a single-channel `GrayImage`.
///
/// Grayscale input is copied unchanged.
#[must_use = "returns the grayscale image"]
pub fn to_gray_image(image: &ImageBuffer) -> GrayImage {
    match image.channels() {
        Channels::Gray => GrayImage::from_fn(image.width(), image.height(), |x, y| {
            Luma([image.sample(x, y, 0)])
        }),
        Channels::Rgb => GrayImage::from_fn(image.width(), image.height(), |x, y| {
            let p = image.pixel(x, y);
            Luma([luma(p[0], p[1], p[2])])
        }),
    }
}

/// Convert to a grayscale [`ImageBuffer`] (channel count 1).
#[must_use = "returns the grayscale image"]
pub fn to_grayscale(image: &ImageBuffer) -> ImageBuffer {
    ImageBuffer::from(to_gray_image(image))
}
