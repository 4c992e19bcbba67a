//! Median blur.
//!
//! Same clipped square window as [`box_blur`](crate::blur::box_blur), but
//! each output sample is the median of the window instead of the mean.
//! This removes isolated impulse (salt-and-pepper) noise and keeps step
//! edges sharp.
//!
//! When the clipped window holds an even number of samples (possible at
//! the borders) the lower of the two middle values is used.
//!
//! Implemented with one 256-bin histogram per channel that slides along
//! each row, adding the entering column and removing the leaving one.

use crate::types::ImageBuffer;

type Histogram = [u32; 256];

/// Add or remove the samples of column `x`, restricted to `rows`.
fn update_column(
    hists: &mut [Histogram],
    src: &[u8],
    width: usize,
    x: usize,
    rows: std::ops::Range<usize>,
    add: bool,
) {
    let n = hists.len();
    for y in rows {
        let base = (y * width + x) * n;
        for (c, hist) in hists.iter_mut().enumerate() {
            let bin = &mut hist[usize::from(src[base + c])];
            if add {
                *bin += 1;
            } else {
                *bin -= 1;
            }
        }
    }
}

/// Value at 0-based `rank` in the sorted multiset described by `hist`.
#[allow(clippy::cast_possible_truncation)]
fn nth_smallest(hist: &Histogram, rank: usize) -> u8 {
    let mut seen = 0usize;
    for (value, &count) in hist.iter().enumerate() {
        seen += count as usize;
        if seen > rank {
            return value as u8;
        }
    }
    u8::MAX
}

/// Median over a `kernel_size` x `kernel_size` window, clipped at the
/// borders, computed per channel.
#[must_use = "returns the blurred image"]
pub fn median_blur(image: &ImageBuffer, kernel_size: u32) -> ImageBuffer {
    let (w, h) = (image.width() as usize, image.height() as usize);
    let n = image.channels().count();
    let radius = (kernel_size / 2) as usize;
    let src = image.as_raw();
    let mut out = vec![0u8; src.len()];
    let mut hists = vec![[0u32; 256]; n];

    for y in 0..h {
        let rows = y.saturating_sub(radius)..(y + radius + 1).min(h);
        for hist in &mut hists {
            hist.fill(0);
        }
        for x in 0..(radius + 1).min(w) {
            update_column(&mut hists, src, w, x, rows.clone(), true);
        }

        for x in 0..w {
            if x > 0 {
                if x + radius < w {
                    update_column(&mut hists, src, w, x + radius, rows.clone(), true);
                }
                if x > radius {
                    update_column(&mut hists, src, w, x - radius - 1, rows.clone(), false);
                }
            }
            let cols = (x + radius + 1).min(w) - x.saturating_sub(radius);
            let rank = (cols * rows.len() - 1) / 2;
            for (c, hist) in hists.iter().enumerate() {
                out[(y * w + x) * n + c] = nth_smallest(hist, rank);
            }
        }
    }

    ImageBuffer::with_layout_of(image, out)
}
