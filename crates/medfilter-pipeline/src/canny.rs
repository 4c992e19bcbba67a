//! Canny edge detection.
//!
//! Stages, in order:
//!
//! 1. Luma conversion (color input only), then a 5-tap Gaussian
//!    (sigma 1.4) to suppress noise.
//! 2. Horizontal and vertical 3x3 Sobel gradients and their L2 magnitude.
//! 3. Non-maximum suppression along the gradient direction, quantized to
//!    0, 45, 90 or 135 degrees. The one-pixel image border is never kept.
//! 4. Double threshold with 8-connected hysteresis.
//!
//! The output is a single-channel buffer of 0 (background) and 255 (edge).

use std::collections::VecDeque;

use image::Luma;
use imageproc::definitions::Image;
use imageproc::filter::filter_clamped;
use imageproc::kernel;

use crate::blur::gaussian_blur;
use crate::grayscale::{to_gray_image, to_grayscale};
use crate::types::{Channels, ImageBuffer};

/// Kernel length of the pre-smoothing Gaussian.
pub const SMOOTHING_KERNEL_SIZE: u32 = 5;

/// Sigma of the pre-smoothing Gaussian.
pub const SMOOTHING_SIGMA: f32 = 1.4;

/// Thresholds are raised to at least this value before hysteresis.
///
/// A zero threshold would accept pixels with no gradient at all and
/// light up a uniform image.
pub const MIN_THRESHOLD: f32 = 1.0;
const _: () = assert!(MIN_THRESHOLD > 0.0);

const EDGE: u8 = 255;

/// Quantized gradient orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Horizontal,
    Diagonal,
    Vertical,
    AntiDiagonal,
}

impl Direction {
    fn from_gradient(gx: f32, gy: f32) -> Self {
        let mut angle = gy.atan2(gx).to_degrees();
        if angle < 0.0 {
            angle += 180.0;
        }
        if (22.5..67.5).contains(&angle) {
            Self::Diagonal
        } else if (67.5..112.5).contains(&angle) {
            Self::Vertical
        } else if (112.5..157.5).contains(&angle) {
            Self::AntiDiagonal
        } else {
            Self::Horizontal
        }
    }

    /// Offsets of the two neighbors along the gradient.
    const fn neighbors(self) -> [(isize, isize); 2] {
        match self {
            Self::Horizontal => [(-1, 0), (1, 0)],
            Self::Diagonal => [(1, 1), (-1, -1)],
            Self::Vertical => [(0, -1), (0, 1)],
            Self::AntiDiagonal => [(-1, 1), (1, -1)],
        }
    }
}

/// Order the thresholds and raise both to at least [`MIN_THRESHOLD`].
///
/// `low > high` is resolved by swapping the two values.
#[allow(clippy::cast_precision_loss)]
fn effective_thresholds(low: i32, high: i32) -> (f32, f32) {
    let (low, high) = if low > high { (high, low) } else { (low, high) };
    (
        (low as f32).max(MIN_THRESHOLD),
        (high as f32).max(MIN_THRESHOLD),
    )
}

/// Run the Canny detector.
///
/// Color input is converted with [`to_grayscale`] first. Thresholds are
/// compared against the L2 gradient magnitude; see [`MIN_THRESHOLD`] and
/// [`effective_thresholds`] for how they are normalized.
#[must_use = "returns the binary edge map"]
pub fn canny(image: &ImageBuffer, low_threshold: i32, high_threshold: i32) -> ImageBuffer {
    let (low, high) = effective_thresholds(low_threshold, high_threshold);
    let gray = match image.channels() {
        Channels::Gray => image.clone(),
        Channels::Rgb => to_grayscale(image),
    };

    // 1. Smooth.
    let smoothed = to_gray_image(&gaussian_blur(&gray, SMOOTHING_KERNEL_SIZE, SMOOTHING_SIGMA));

    // 2. Gradients.
    let gx: Image<Luma<i16>> = filter_clamped(&smoothed, kernel::SOBEL_HORIZONTAL_3X3);
    let gy: Image<Luma<i16>> = filter_clamped(&smoothed, kernel::SOBEL_VERTICAL_3X3);
    let gx: Vec<f32> = gx.as_raw().iter().map(|&v| f32::from(v)).collect();
    let gy: Vec<f32> = gy.as_raw().iter().map(|&v| f32::from(v)).collect();
    let magnitude: Vec<f32> = gx.iter().zip(&gy).map(|(h, v)| h.hypot(*v)).collect();

    let (w, h) = (image.width() as usize, image.height() as usize);

    // 3. Thin.
    let thinned = non_maximum_suppression(&magnitude, &gx, &gy, w, h);

    // 4. Threshold and link.
    let edges = hysteresis(&thinned, w, h, low, high);
    ImageBuffer::with_layout_of(&gray, edges)
}

/// Zero every magnitude that is not a local maximum along its gradient.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn non_maximum_suppression(
    magnitude: &[f32],
    gx: &[f32],
    gy: &[f32],
    w: usize,
    h: usize,
) -> Vec<f32> {
    let mut out = vec![0.0; magnitude.len()];
    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            let i = y * w + x;
            let m = magnitude[i];
            if m == 0.0 {
                continue;
            }
            let is_max = Direction::from_gradient(gx[i], gy[i])
                .neighbors()
                .iter()
                .all(|&(dx, dy)| {
                    let nx = (x as isize + dx) as usize;
                    let ny = (y as isize + dy) as usize;
                    m >= magnitude[ny * w + nx]
                });
            if is_max {
                out[i] = m;
            }
        }
    }
    out
}

/// Keep pixels at or above `high`, plus pixels at or above `low` that
/// are 8-connected to a kept pixel.
fn hysteresis(thinned: &[f32], w: usize, h: usize, low: f32, high: f32) -> Vec<u8> {
    let mut out = vec![0u8; thinned.len()];
    let mut queue = VecDeque::new();

    for (i, &m) in thinned.iter().enumerate() {
        if m < high || out[i] == EDGE {
            continue;
        }
        out[i] = EDGE;
        queue.push_back(i);
        while let Some(j) = queue.pop_front() {
            let (x, y) = (j % w, j / w);
            for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                    let k = ny * w + nx;
                    if out[k] == 0 && thinned[k] >= low {
                        out[k] = EDGE;
                        queue.push_back(k);
                    }
                }
            }
        }
    }
    out
}
