//! Shared types for the medfilter pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can hand single-channel
/// rasters to the pipeline without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage` for the same reason as [`GrayImage`].
pub use image::RgbImage;

/// Display name of the unfiltered image in every run.
pub const ORIGINAL_IMAGE_NAME: &str = "Original Image";

/// Smallest accepted kernel size for the windowed filters.
pub const MIN_KERNEL_SIZE: u32 = 3;

/// Largest accepted Canny threshold (thresholds are 8-bit intensities).
pub const MAX_THRESHOLD: i32 = 255;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Channel layout of an [`ImageBuffer`].
///
/// Color buffers are always stored in R, G, B order, regardless of
/// how the source file laid its samples out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channels {
    /// One luma sample per pixel.
    Gray,
    /// Red, green, blue samples per pixel.
    Rgb,
}

impl Channels {
    /// Number of samples per pixel.
    #[must_use]
    pub const fn count(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
        }
    }
}

/// A decoded raster: dense row-major grid of 8-bit samples.
///
/// Width, height and channel layout are fixed at construction. Filters
/// never mutate a buffer in place; they allocate a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    channels: Channels,
    data: Vec<u8>,
}

impl ImageBuffer {
    /// Wrap raw samples. Returns `None` if `data.len()` does not equal
    /// `width * height * channels`.
    #[must_use]
    pub fn from_raw(width: u32, height: u32, channels: Channels, data: Vec<u8>) -> Option<Self> {
        let expected = (width as usize) * (height as usize) * channels.count();
        (data.len() == expected).then_some(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Wrap samples computed for a buffer with `template`'s layout.
    pub(crate) fn with_layout_of(template: &Self, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), template.data.len());
        Self {
            width: template.width,
            height: template.height,
            channels: template.channels,
            data,
        }
    }

    /// Build a buffer by evaluating `f(x, y, channel)` for every sample.
    #[must_use]
    pub fn from_fn(
        width: u32,
        height: u32,
        channels: Channels,
        mut f: impl FnMut(u32, u32, usize) -> u8,
    ) -> Self {
        let n = channels.count();
        let mut data = Vec::with_capacity((width as usize) * (height as usize) * n);
        for y in 0..height {
            for x in 0..width {
                for c in 0..n {
                    data.push(f(x, y, c));
                }
            }
        }
        Self {
            width,
            height,
            channels,
            data,
        }
    }

    /// A buffer where every pixel has the same samples.
    ///
    /// `pixel` must have exactly `channels.count()` entries; extra
    /// entries are ignored and missing ones read as zero.
    #[must_use]
    pub fn filled(width: u32, height: u32, channels: Channels, pixel: &[u8]) -> Self {
        Self::from_fn(width, height, channels, |_, _, c| {
            pixel.get(c).copied().unwrap_or(0)
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Channel layout.
    #[must_use]
    pub const fn channels(&self) -> Channels {
        self.channels
    }

    /// Width and height.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// All samples in row-major, channel-interleaved order.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer and return its samples.
    #[must_use]
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Index of sample `c` of pixel `(x, y)` in [`as_raw`](Self::as_raw).
    #[must_use]
    pub const fn index(&self, x: u32, y: u32, c: usize) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * self.channels.count() + c
    }

    /// Sample `c` of pixel `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates or channel are out of bounds.
    #[must_use]
    pub fn sample(&self, x: u32, y: u32, c: usize) -> u8 {
        self.data[self.index(x, y, c)]
    }

    /// All samples of pixel `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let start = self.index(x, y, 0);
        &self.data[start..start + self.channels.count()]
    }
}

impl ImageBuffer {
    /// Copy into an `RgbImage`. Gray samples are replicated into all
    /// three channels.
    #[must_use]
    pub fn to_rgb_image(&self) -> RgbImage {
        match self.channels {
            Channels::Rgb => RgbImage::from_fn(self.width, self.height, |x, y| {
                let p = self.pixel(x, y);
                image::Rgb([p[0], p[1], p[2]])
            }),
            Channels::Gray => RgbImage::from_fn(self.width, self.height, |x, y| {
                image::Rgb([self.sample(x, y, 0); 3])
            }),
        }
    }
}

impl From<GrayImage> for ImageBuffer {
    fn from(image: GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            channels: Channels::Gray,
            data: image.into_raw(),
        }
    }
}

impl From<RgbImage> for ImageBuffer {
    fn from(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            channels: Channels::Rgb,
            data: image.into_raw(),
        }
    }
}

/// The four filters a run can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterKind {
    /// Mean over a square window.
    BoxBlur,
    /// Median over a square window.
    MedianBlur,
    /// Separable Gaussian convolution.
    GaussianBlur,
    /// Canny edge detector.
    Canny,
}

impl FilterKind {
    /// Every kind, in selection order.
    pub const ALL: [Self; 4] = [
        Self::BoxBlur,
        Self::MedianBlur,
        Self::GaussianBlur,
        Self::Canny,
    ];

    /// Fixed name the result of this filter is shown and exported under.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::BoxBlur => "Blurred Image",
            Self::MedianBlur => "Median Blurred Image",
            Self::GaussianBlur => "Gaussian Filtered Image",
            Self::Canny => "Canny Algorithm Applied",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BoxBlur => "box blur",
            Self::MedianBlur => "median blur",
            Self::GaussianBlur => "Gaussian blur",
            Self::Canny => "Canny",
        })
    }
}

/// One filter to apply, with its parameters.
///
/// Construct freely, then call [`validate`](Self::validate) (the
/// orchestrator does this for every spec before running any filter).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterSpec {
    /// Clipped-window mean.
    BoxBlur {
        /// Odd window side, at least [`MIN_KERNEL_SIZE`].
        kernel_size: u32,
    },
    /// Clipped-window median.
    MedianBlur {
        /// Odd window side, at least [`MIN_KERNEL_SIZE`].
        kernel_size: u32,
    },
    /// Separable Gaussian blur with clamp-to-edge borders.
    GaussianBlur {
        /// Odd kernel length, at least [`MIN_KERNEL_SIZE`].
        kernel_size: u32,
        /// Standard deviation; must be finite and positive.
        sigma: f32,
    },
    /// Canny edge detection on the luma of the image.
    ///
    /// If `low_threshold > high_threshold` the two are swapped.
    Canny {
        /// Hysteresis low threshold in `0..=255`.
        low_threshold: i32,
        /// Hysteresis high threshold in `0..=255`.
        high_threshold: i32,
    },
}

impl FilterSpec {
    /// Which filter this spec configures.
    #[must_use]
    pub const fn kind(&self) -> FilterKind {
        match self {
            Self::BoxBlur { .. } => FilterKind::BoxBlur,
            Self::MedianBlur { .. } => FilterKind::MedianBlur,
            Self::GaussianBlur { .. } => FilterKind::GaussianBlur,
            Self::Canny { .. } => FilterKind::Canny,
        }
    }

    /// Check the structural parameter invariants.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameter`] if a kernel size is even or below
    /// [`MIN_KERNEL_SIZE`], sigma is not a finite positive number, or a
    /// threshold lies outside `0..=255`.
    pub fn validate(&self) -> Result<(), InvalidParameter> {
        let kind = self.kind();
        match *self {
            Self::BoxBlur { kernel_size } | Self::MedianBlur { kernel_size } => {
                check_kernel_size(kind, kernel_size)
            }
            Self::GaussianBlur { kernel_size, sigma } => {
                check_kernel_size(kind, kernel_size)?;
                if sigma.is_finite() && sigma > 0.0 {
                    Ok(())
                } else {
                    Err(InvalidParameter::new(
                        kind,
                        "sigma",
                        format!("must be a finite value greater than 0, got {sigma}"),
                    ))
                }
            }
            Self::Canny {
                low_threshold,
                high_threshold,
            } => {
                check_threshold(kind, "low_threshold", low_threshold)?;
                check_threshold(kind, "high_threshold", high_threshold)
            }
        }
    }
}

fn check_kernel_size(kind: FilterKind, kernel_size: u32) -> Result<(), InvalidParameter> {
    if kernel_size < MIN_KERNEL_SIZE {
        return Err(InvalidParameter::new(
            kind,
            "kernel_size",
            format!("must be at least {MIN_KERNEL_SIZE}, got {kernel_size}"),
        ));
    }
    if kernel_size % 2 == 0 {
        return Err(InvalidParameter::new(
            kind,
            "kernel_size",
            format!("must be odd, got {kernel_size}"),
        ));
    }
    Ok(())
}

fn check_threshold(
    kind: FilterKind,
    parameter: &'static str,
    value: i32,
) -> Result<(), InvalidParameter> {
    if (0..=MAX_THRESHOLD).contains(&value) {
        Ok(())
    } else {
        Err(InvalidParameter::new(
            kind,
            parameter,
            format!("must be in 0..={MAX_THRESHOLD}, got {value}"),
        ))
    }
}

/// Output of one filter (or the untouched original) within a run.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterResult {
    /// Display name, unique within the run.
    pub name: String,
    /// The produced image.
    pub image: ImageBuffer,
    /// The spec that produced the image; `None` for the original.
    pub spec: Option<FilterSpec>,
}

impl FilterResult {
    /// Wrap the unfiltered image under [`ORIGINAL_IMAGE_NAME`].
    #[must_use]
    pub fn original(image: ImageBuffer) -> Self {
        Self {
            name: ORIGINAL_IMAGE_NAME.to_owned(),
            image,
            spec: None,
        }
    }

    /// Preview caption: the display name followed by the parameters
    /// that produced it.
    #[must_use]
    pub fn caption(&self) -> String {
        match self.spec {
            None => self.name.clone(),
            Some(
                FilterSpec::BoxBlur { kernel_size } | FilterSpec::MedianBlur { kernel_size },
            ) => format!("{} (Kernel Size: {kernel_size})", self.name),
            Some(FilterSpec::GaussianBlur { kernel_size, sigma }) => format!(
                "{} (Kernel Size: {kernel_size}, Sigma: {sigma:?})",
                self.name
            ),
            Some(FilterSpec::Canny {
                low_threshold,
                high_threshold,
            }) => format!(
                "{} (Thresholds: {low_threshold}, {high_threshold})",
                self.name
            ),
        }
    }
}

/// A filter parameter failed validation. No filter runs when this is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {parameter} for {filter}: {reason}")]
pub struct InvalidParameter {
    /// The filter whose parameter was rejected.
    pub filter: FilterKind,
    /// Parameter name, as spelled in [`FilterSpec`].
    pub parameter: &'static str,
    /// What was wrong with the value.
    pub reason: String,
}

impl InvalidParameter {
    pub(crate) fn new(filter: FilterKind, parameter: &'static str, reason: String) -> Self {
        Self {
            filter,
            parameter,
            reason,
        }
    }
}

/// Failure to turn input bytes into an [`ImageBuffer`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The input image data was empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The data is not a PNG or JPEG file.
    #[error("unsupported image format (expected PNG or JPEG)")]
    UnsupportedFormat,

    /// The codec rejected the data.
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Failure to encode an [`ImageBuffer`] as PNG.
#[derive(Debug, thiserror::Error)]
#[error("failed to encode image as PNG: {0}")]
pub struct EncodeError(#[from] pub image::ImageError);

/// Errors from a pipeline run, tagged by the stage that failed.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The input bytes could not be decoded.
    #[error("decode stage failed: {0}")]
    Decode(#[from] DecodeError),

    /// A filter parameter was rejected before any filter ran.
    #[error("parameter validation failed: {0}")]
    InvalidParameter(#[from] InvalidParameter),

    /// The same filter kind appeared twice in one run.
    #[error("{0} was selected more than once")]
    DuplicateFilter(FilterKind),
}
