//! Filter orchestration.
//!
//! Every enabled filter reads the same untouched original; no filter
//! ever sees another filter's output. The result list always starts
//! with the original under [`ORIGINAL_IMAGE_NAME`](crate::ORIGINAL_IMAGE_NAME),
//! followed by one entry per spec in the order given.

use std::time::Instant;

use crate::blur::{box_blur, gaussian_blur};
use crate::canny::canny;
use crate::median::median_blur;
use crate::types::{FilterKind, FilterResult, FilterSpec, ImageBuffer, PipelineError};

/// Apply a single filter to `image`.
///
/// The spec is not validated here; see [`run`] for the checked entry
/// point.
#[must_use = "returns the filtered image"]
pub fn apply(spec: &FilterSpec, image: &ImageBuffer) -> ImageBuffer {
    match *spec {
        FilterSpec::BoxBlur { kernel_size } => box_blur(image, kernel_size),
        FilterSpec::MedianBlur { kernel_size } => median_blur(image, kernel_size),
        FilterSpec::GaussianBlur { kernel_size, sigma } => gaussian_blur(image, kernel_size, sigma),
        FilterSpec::Canny {
            low_threshold,
            high_threshold,
        } => canny(image, low_threshold, high_threshold),
    }
}

/// Check every spec, and that no filter kind repeats, before any filter
/// runs.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidParameter`] for the first invalid spec
/// and [`PipelineError::DuplicateFilter`] for the first repeated kind.
pub fn validate(specs: &[FilterSpec]) -> Result<(), PipelineError> {
    let mut seen: Vec<FilterKind> = Vec::with_capacity(specs.len());
    for spec in specs {
        spec.validate()?;
        let kind = spec.kind();
        if seen.contains(&kind) {
            return Err(PipelineError::DuplicateFilter(kind));
        }
        seen.push(kind);
    }
    Ok(())
}

fn run_one(spec: &FilterSpec, original: &ImageBuffer) -> FilterResult {
    let start = Instant::now();
    let image = apply(spec, original);
    tracing::debug!(
        filter = %spec.kind(),
        ?spec,
        elapsed = ?start.elapsed(),
        "filter applied",
    );
    FilterResult {
        name: spec.kind().display_name().to_owned(),
        image,
        spec: Some(*spec),
    }
}

/// Run each spec against `original` and collect the named results.
///
/// Returns `specs.len() + 1` results: the original first, then one per
/// spec in order.
///
/// # Errors
///
/// Any validation failure from [`validate`]. Nothing runs in that case.
pub fn run(
    original: &ImageBuffer,
    specs: &[FilterSpec],
) -> Result<Vec<FilterResult>, PipelineError> {
    validate(specs)?;
    tracing::debug!(
        filters = specs.len(),
        width = original.width(),
        height = original.height(),
        channels = original.channels().count(),
        "running filters",
    );

    let mut results = Vec::with_capacity(specs.len() + 1);
    results.push(FilterResult::original(original.clone()));
    results.extend(specs.iter().map(|spec| run_one(spec, original)));
    Ok(results)
}

/// Like [`run`], but filters execute concurrently on the rayon pool.
///
/// Results come back in the same order [`run`] produces them.
///
/// # Errors
///
/// Same as [`run`].
#[cfg(feature = "parallel")]
pub fn run_parallel(
    original: &ImageBuffer,
    specs: &[FilterSpec],
) -> Result<Vec<FilterResult>, PipelineError> {
    use rayon::prelude::*;

    validate(specs)?;
    tracing::debug!(filters = specs.len(), "running filters in parallel");

    let filtered: Vec<FilterResult> = specs
        .par_iter()
        .map(|spec| run_one(spec, original))
        .collect();

    let mut results = Vec::with_capacity(specs.len() + 1);
    results.push(FilterResult::original(original.clone()));
    results.extend(filtered);
    Ok(results)
}
