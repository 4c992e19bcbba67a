//! Smoothing filters: box blur and Gaussian blur.
//!
//! Both operate on every channel independently and preserve the
//! buffer's dimensions and channel layout.
//!
//! - [`box_blur`] averages a square window. Near the border the window
//!   is clipped to the image and only in-bounds samples are averaged.
//! - [`gaussian_blur`] convolves rows, then columns, with a normalized
//!   1-D Gaussian kernel. Border samples are replicated (clamp-to-edge).
//!
//! Kernel sizes are expected to be validated by the caller (see
//! [`FilterSpec::validate`](crate::FilterSpec::validate)); both functions
//! still return a well-defined result for any size.

use crate::types::ImageBuffer;

/// Clamp `pos + offset - radius` into `0..len` without signed math.
fn clamp_index(pos: usize, offset: usize, radius: usize, len: usize) -> usize {
    (pos + offset).saturating_sub(radius).min(len - 1)
}

/// Mean over a `kernel_size` x `kernel_size` window centered on each pixel.
///
/// The window is clipped at the borders; the mean is taken over the
/// samples that fall inside the image and rounded half-up. Built on a
/// summed-area table, so the cost per pixel does not depend on the
/// kernel size.
#[must_use = "returns the blurred image"]
#[allow(clippy::cast_possible_truncation)]
pub fn box_blur(image: &ImageBuffer, kernel_size: u32) -> ImageBuffer {
    let (w, h) = (image.width() as usize, image.height() as usize);
    let n = image.channels().count();
    let radius = (kernel_size / 2) as usize;
    let src = image.as_raw();

    // sat[(y * (w + 1) + x) * n + c] = sum of samples above-left of (x, y).
    let stride = (w + 1) * n;
    let mut sat = vec![0u64; (h + 1) * stride];
    let mut row_sum = vec![0u64; n];
    for y in 0..h {
        row_sum.fill(0);
        for x in 0..w {
            for c in 0..n {
                row_sum[c] += u64::from(src[(y * w + x) * n + c]);
                sat[(y + 1) * stride + (x + 1) * n + c] =
                    sat[y * stride + (x + 1) * n + c] + row_sum[c];
            }
        }
    }

    ImageBuffer::from_fn(image.width(), image.height(), image.channels(), |x, y, c| {
        let (x, y) = (x as usize, y as usize);
        let (x0, x1) = (x.saturating_sub(radius), (x + radius + 1).min(w));
        let (y0, y1) = (y.saturating_sub(radius), (y + radius + 1).min(h));
        let at = |xx: usize, yy: usize| sat[yy * stride + xx * n + c];
        let sum = (at(x1, y1) + at(x0, y0)) - (at(x1, y0) + at(x0, y1));
        let count = ((x1 - x0) * (y1 - y0)) as u64;
        ((sum + count / 2) / count) as u8
    })
}

/// Normalized 1-D Gaussian kernel of length `kernel_size`.
///
/// `w[i] = exp(-(i - c)^2 / (2 sigma^2))` with `c = (kernel_size - 1) / 2`,
/// scaled so the weights sum to 1. As sigma approaches zero all weight
/// lands on the center tap; a sigma too small for `2 sigma^2` to be a
/// normal `f32` gives that identity kernel directly.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn gaussian_kernel_1d(kernel_size: u32, sigma: f32) -> Vec<f32> {
    let center = (kernel_size as f32 - 1.0) / 2.0;
    let two_sigma_sq = 2.0 * sigma * sigma;
    if !(two_sigma_sq.is_normal() && two_sigma_sq > 0.0) {
        return identity_kernel(kernel_size);
    }
    let mut kernel: Vec<f32> = (0..kernel_size)
        .map(|i| {
            let d = i as f32 - center;
            (-d * d / two_sigma_sq).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    if !(sum.is_finite() && sum > 0.0) {
        return identity_kernel(kernel_size);
    }
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// All weight on the center tap.
fn identity_kernel(kernel_size: u32) -> Vec<f32> {
    let mut kernel = vec![0.0; kernel_size as usize];
    if let Some(w) = kernel.get_mut((kernel_size as usize).saturating_sub(1) / 2) {
        *w = 1.0;
    }
    kernel
}

/// Separable Gaussian blur with a `kernel_size`-tap kernel.
///
/// Rows are convolved first, then columns, with borders replicated.
/// Intermediate values stay in `f32`; the output is rounded to nearest
/// and clamped to `0..=255`. Non-positive sigma or a zero kernel size
/// returns the image unchanged.
#[must_use = "returns the blurred image"]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::many_single_char_names
)]
pub fn gaussian_blur(image: &ImageBuffer, kernel_size: u32, sigma: f32) -> ImageBuffer {
    if kernel_size == 0 || sigma.is_nan() || sigma <= 0.0 {
        return image.clone();
    }

    let kernel = gaussian_kernel_1d(kernel_size, sigma);
    let radius = kernel.len() / 2;
    let (w, h) = (image.width() as usize, image.height() as usize);
    let n = image.channels().count();
    let src = image.as_raw();

    // Horizontal pass.
    let mut tmp = vec![0.0f32; w * h * n];
    for y in 0..h {
        for x in 0..w {
            for c in 0..n {
                tmp[(y * w + x) * n + c] = kernel
                    .iter()
                    .enumerate()
                    .map(|(i, &k)| {
                        let sx = clamp_index(x, i, radius, w);
                        k * f32::from(src[(y * w + sx) * n + c])
                    })
                    .sum();
            }
        }
    }

    // Vertical pass.
    ImageBuffer::from_fn(image.width(), image.height(), image.channels(), |x, y, c| {
        let (x, y) = (x as usize, y as usize);
        let v: f32 = kernel
            .iter()
            .enumerate()
            .map(|(i, &k)| {
                let sy = clamp_index(y, i, radius, h);
                k * tmp[(sy * w + x) * n + c]
            })
            .sum();
        v.round().clamp(0.0, 255.0) as u8
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Channels;

    /// 10x10 gray image with a sharp black-to-white boundary at x = 5.
    fn sharp_edge_image() -> ImageBuffer {
        ImageBuffer::from_fn(10, 10, Channels::Gray, |x, _, _| if x < 5 { 0 } else { 255 })
    }

    fn noisy_rgb() -> ImageBuffer {
        ImageBuffer::from_fn(12, 9, Channels::Rgb, |x, y, c| {
            let v = (x * 37 + y * 91 + u32::try_from(c).unwrap_or(0) * 53) % 256;
            u8::try_from(v).unwrap_or(0)
        })
    }

    // ─────── box_blur ────────────────────────────────────────────

    #[test]
    fn box_uniform_image_unchanged() {
        let img = ImageBuffer::filled(11, 7, Channels::Rgb, &[100, 150, 200]);
        for k in [3, 5, 9, 29] {
            assert_eq!(box_blur(&img, k), img, "kernel size {k}");
        }
    }

    #[test]
    fn box_preserves_dimensions_and_channels() {
        let img = noisy_rgb();
        let out = box_blur(&img, 5);
        assert_eq!(out.dimensions(), img.dimensions());
        assert_eq!(out.channels(), Channels::Rgb);
    }

    #[test]
    fn box_interior_is_window_mean() {
        let img = noisy_rgb();
        let out = box_blur(&img, 3);
        for c in 0..3 {
            let sum: u32 = (3..=5)
                .flat_map(|y| (3..=5).map(move |x| (x, y)))
                .map(|(x, y)| u32::from(img.sample(x, y, c)))
                .sum();
            let expected = u8::try_from((sum + 4) / 9).unwrap_or(0);
            assert_eq!(out.sample(4, 4, c), expected, "channel {c}");
        }
    }

    #[test]
    fn box_corner_averages_only_in_bounds_samples() {
        // Only (0,0) is bright; a 3x3 window at the corner covers 4 pixels.
        let img = ImageBuffer::from_fn(4, 4, Channels::Gray, |x, y, _| {
            if x == 0 && y == 0 {
                200
            } else {
                0
            }
        });
        let out = box_blur(&img, 3);
        assert_eq!(out.sample(0, 0, 0), 50);
        // Interior neighbor (1,1) sees 9 samples: 200 / 9 = 22.2 -> 22.
        assert_eq!(out.sample(1, 1, 0), 22);
    }

    #[test]
    fn box_kernel_larger_than_image_averages_everything() {
        let img = ImageBuffer::from_fn(3, 1, Channels::Gray, |x, _, _| {
            [0, 30, 90][x as usize]
        });
        let out = box_blur(&img, 29);
        assert!(out.as_raw().iter().all(|&v| v == 40));
    }

    // ─────── gaussian_kernel_1d ──────────────────────────────────

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let k = gaussian_kernel_1d(7, 1.5);
        assert_eq!(k.len(), 7);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5, "sum was {sum}");
        for i in 0..3 {
            assert!((k[i] - k[6 - i]).abs() < 1e-7);
            assert!(k[i] < k[i + 1], "weights should rise toward the center");
        }
    }

    #[test]
    fn vanishing_sigma_kernel_is_exact_identity() {
        // 2 * sigma^2 underflows to zero here.
        for k in [3, 5, 21] {
            let kernel = gaussian_kernel_1d(k, 1e-30);
            assert!(kernel.iter().all(|w| w.is_finite()), "{kernel:?}");
            let center = (k as usize - 1) / 2;
            for (i, &w) in kernel.iter().enumerate() {
                let expected = if i == center { 1.0 } else { 0.0 };
                assert!((w - expected).abs() < f32::EPSILON, "tap {i} of {kernel:?}");
            }
        }
    }

    #[test]
    fn gaussian_vanishing_sigma_returns_input() {
        let spec = crate::types::FilterSpec::GaussianBlur {
            kernel_size: 3,
            sigma: 1e-30,
        };
        assert!(spec.validate().is_ok());
        let img = ImageBuffer::filled(4, 4, Channels::Gray, &[200]);
        assert_eq!(gaussian_blur(&img, 3, 1e-30), img);
        assert_eq!(gaussian_blur(&noisy_rgb(), 5, f32::MIN_POSITIVE), noisy_rgb());
    }

    #[test]
    fn tiny_sigma_kernel_is_identity() {
        let k = gaussian_kernel_1d(3, 0.01);
        assert!(k[0].abs() < 1e-6);
        assert!((k[1] - 1.0).abs() < 1e-6);
        assert!(k[2].abs() < 1e-6);
    }

    // ─────── gaussian_blur ───────────────────────────────────────

    #[test]
    fn gaussian_tiny_sigma_is_near_identity() {
        let img = noisy_rgb();
        let out = gaussian_blur(&img, 3, 0.01);
        for (a, b) in img.as_raw().iter().zip(out.as_raw()) {
            assert!(a.abs_diff(*b) <= 1, "expected near-identity, {a} vs {b}");
        }
    }

    #[test]
    fn gaussian_non_positive_sigma_returns_identical_image() {
        let img = sharp_edge_image();
        assert_eq!(gaussian_blur(&img, 5, 0.0), img);
        assert_eq!(gaussian_blur(&img, 5, -1.0), img);
    }

    #[test]
    fn gaussian_uniform_image_unchanged() {
        let img = ImageBuffer::filled(10, 10, Channels::Rgb, &[100, 150, 200]);
        assert_eq!(gaussian_blur(&img, 9, 2.5), img);
    }

    #[test]
    fn gaussian_smooths_sharp_edge() {
        let out = gaussian_blur(&sharp_edge_image(), 5, 2.0);
        let left = out.sample(4, 5, 0);
        let right = out.sample(5, 5, 0);
        assert!(left > 0, "expected blur to raise left-of-edge above 0, got {left}");
        assert!(right < 255, "expected blur to lower right-of-edge below 255, got {right}");
    }

    #[test]
    fn gaussian_clamped_border_has_no_dark_fringe() {
        // A uniform bright image must not darken at the border.
        let img = ImageBuffer::filled(6, 6, Channels::Gray, &[250]);
        let out = gaussian_blur(&img, 21, 10.0);
        assert!(out.as_raw().iter().all(|&v| v == 250));
    }

    #[test]
    fn gaussian_impulse_response_is_isotropic() {
        let img = ImageBuffer::from_fn(15, 15, Channels::Gray, |x, y, _| {
            if x == 7 && y == 7 {
                255
            } else {
                0
            }
        });
        let out = gaussian_blur(&img, 7, 1.5);
        for d in 1..=3 {
            let horizontal = out.sample(7 + d, 7, 0);
            let vertical = out.sample(7, 7 + d, 0);
            assert!(
                horizontal.abs_diff(vertical) <= 1,
                "offset {d}: {horizontal} vs {vertical}",
            );
            assert!(out.sample(7 - d, 7, 0).abs_diff(horizontal) <= 1);
        }
    }

    #[test]
    fn larger_kernel_spreads_impulse_further() {
        let img = ImageBuffer::from_fn(21, 21, Channels::Gray, |x, y, _| {
            if x == 10 && y == 10 {
                255
            } else {
                0
            }
        });
        let small = gaussian_blur(&img, 3, 3.0);
        let large = gaussian_blur(&img, 11, 3.0);
        assert!(large.sample(10, 10, 0) < small.sample(10, 10, 0));
        // Four pixels away is outside the 3-tap support entirely.
        assert_eq!(small.sample(14, 10, 0), 0);
        assert!(large.sample(14, 10, 0) > 0);
    }
}
