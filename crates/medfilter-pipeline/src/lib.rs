//! medfilter-pipeline: Pure image filtering pipeline (sans-IO).
//!
//! Decodes an uploaded PNG or JPEG and applies any of four independent
//! filters to it: box blur, median blur, Gaussian blur and Canny edge
//! detection. Each filter reads the untouched original; outputs are
//! collected as an ordered list of named [`FilterResult`]s ready for
//! preview or export.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. Archive packaging lives in
//! `medfilter-export`.

pub mod blur;
pub mod canny;
pub mod codec;
pub mod grayscale;
pub mod median;
pub mod pipeline;
pub mod selection;
pub mod types;

pub use codec::{decode, encode};
pub use grayscale::to_grayscale;
#[cfg(feature = "parallel")]
pub use pipeline::run_parallel;
pub use pipeline::{apply, run};
pub use selection::FilterSelection;
pub use types::{
    Channels, DecodeError, Dimensions, EncodeError, FilterKind, FilterResult, FilterSpec,
    ImageBuffer, InvalidParameter, ORIGINAL_IMAGE_NAME, PipelineError,
};

/// Decode `image_bytes` and run every filter enabled in `selection`.
///
/// # Pipeline steps
///
/// 1. Decode the PNG or JPEG bytes
/// 2. Validate the selection and turn it into ordered filter specs
/// 3. Apply each filter to the decoded original
///
/// # Errors
///
/// Returns [`PipelineError::Decode`] if the bytes are empty, not PNG or
/// JPEG, or corrupt. Returns [`PipelineError::InvalidParameter`] if an
/// enabled filter has an out-of-range parameter; no filter runs then.
pub fn process(
    image_bytes: &[u8],
    selection: &FilterSelection,
) -> Result<Vec<FilterResult>, PipelineError> {
    // 1. Decode.
    let original = decode(image_bytes)?;

    // 2. Validate.
    let specs = selection.to_specs()?;

    // 3. Filter.
    run(&original, &specs)
}
