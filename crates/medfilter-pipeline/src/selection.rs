//! The filter selection a front end hands to the pipeline.
//!
//! [`FilterSelection`] is an immutable record of which filters are
//! enabled and with which parameters. It is the only configuration the
//! pipeline consumes; nothing is read from process-wide state.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::types::{FilterKind, FilterSpec, InvalidParameter, MAX_THRESHOLD};

/// Accepted box blur kernel sizes (odd values only).
pub const BOX_KERNEL_RANGE: RangeInclusive<u32> = 3..=30;

/// Accepted median blur kernel sizes (odd values only).
pub const MEDIAN_KERNEL_RANGE: RangeInclusive<u32> = 3..=30;

/// Accepted Gaussian kernel sizes (odd values only).
pub const GAUSSIAN_KERNEL_RANGE: RangeInclusive<u32> = 3..=21;

/// Accepted Gaussian sigma values.
pub const GAUSSIAN_SIGMA_RANGE: RangeInclusive<f32> = 0.1..=10.0;

/// Accepted Canny thresholds.
pub const CANNY_THRESHOLD_RANGE: RangeInclusive<i32> = 0..=MAX_THRESHOLD;

/// Which filters to run, and how.
///
/// Missing fields deserialize to their defaults, so a JSON object only
/// needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSelection {
    /// Run the box blur.
    pub enable_box_blur: bool,
    /// Box blur kernel size.
    pub box_kernel_size: u32,

    /// Run the median blur.
    pub enable_median_blur: bool,
    /// Median blur kernel size.
    pub median_kernel_size: u32,

    /// Run the Gaussian blur.
    pub enable_gaussian_blur: bool,
    /// Gaussian kernel size.
    pub gaussian_kernel_size: u32,
    /// Gaussian sigma.
    pub gaussian_sigma: f32,

    /// Run the Canny detector.
    pub enable_canny: bool,
    /// Canny low threshold.
    pub canny_low: i32,
    /// Canny high threshold.
    pub canny_high: i32,
}

impl FilterSelection {
    /// Default kernel size for every windowed filter.
    pub const DEFAULT_KERNEL_SIZE: u32 = 5;
    /// Default Gaussian sigma.
    pub const DEFAULT_GAUSSIAN_SIGMA: f32 = 1.0;
    /// Default Canny low threshold.
    pub const DEFAULT_CANNY_LOW: i32 = 100;
    /// Default Canny high threshold.
    pub const DEFAULT_CANNY_HIGH: i32 = 200;

    /// A selection with every filter enabled at its default parameters.
    #[must_use]
    pub fn all() -> Self {
        Self {
            enable_box_blur: true,
            enable_median_blur: true,
            enable_gaussian_blur: true,
            enable_canny: true,
            ..Self::default()
        }
    }

    /// Number of enabled filters.
    #[must_use]
    pub fn enabled_count(&self) -> usize {
        [
            self.enable_box_blur,
            self.enable_median_blur,
            self.enable_gaussian_blur,
            self.enable_canny,
        ]
        .into_iter()
        .filter(|&on| on)
        .count()
    }

    /// Validate the enabled filters and list them in selection order
    /// (box, median, Gaussian, Canny).
    ///
    /// Parameters of disabled filters are not checked.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidParameter`] for the first enabled filter whose
    /// parameter lies outside its accepted range or is an even kernel
    /// size.
    pub fn to_specs(&self) -> Result<Vec<FilterSpec>, InvalidParameter> {
        let mut specs = Vec::with_capacity(self.enabled_count());
        if self.enable_box_blur {
            check_kernel(FilterKind::BoxBlur, self.box_kernel_size, &BOX_KERNEL_RANGE)?;
            specs.push(FilterSpec::BoxBlur {
                kernel_size: self.box_kernel_size,
            });
        }
        if self.enable_median_blur {
            check_kernel(
                FilterKind::MedianBlur,
                self.median_kernel_size,
                &MEDIAN_KERNEL_RANGE,
            )?;
            specs.push(FilterSpec::MedianBlur {
                kernel_size: self.median_kernel_size,
            });
        }
        if self.enable_gaussian_blur {
            check_kernel(
                FilterKind::GaussianBlur,
                self.gaussian_kernel_size,
                &GAUSSIAN_KERNEL_RANGE,
            )?;
            if !GAUSSIAN_SIGMA_RANGE.contains(&self.gaussian_sigma) {
                return Err(InvalidParameter::new(
                    FilterKind::GaussianBlur,
                    "sigma",
                    format!(
                        "must be in {}..={}, got {}",
                        GAUSSIAN_SIGMA_RANGE.start(),
                        GAUSSIAN_SIGMA_RANGE.end(),
                        self.gaussian_sigma
                    ),
                ));
            }
            specs.push(FilterSpec::GaussianBlur {
                kernel_size: self.gaussian_kernel_size,
                sigma: self.gaussian_sigma,
            });
        }
        if self.enable_canny {
            check_range(
                FilterKind::Canny,
                "low_threshold",
                self.canny_low,
                &CANNY_THRESHOLD_RANGE,
            )?;
            check_range(
                FilterKind::Canny,
                "high_threshold",
                self.canny_high,
                &CANNY_THRESHOLD_RANGE,
            )?;
            specs.push(FilterSpec::Canny {
                low_threshold: self.canny_low,
                high_threshold: self.canny_high,
            });
        }
        Ok(specs)
    }
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            enable_box_blur: false,
            box_kernel_size: Self::DEFAULT_KERNEL_SIZE,
            enable_median_blur: false,
            median_kernel_size: Self::DEFAULT_KERNEL_SIZE,
            enable_gaussian_blur: false,
            gaussian_kernel_size: Self::DEFAULT_KERNEL_SIZE,
            gaussian_sigma: Self::DEFAULT_GAUSSIAN_SIGMA,
            enable_canny: false,
            canny_low: Self::DEFAULT_CANNY_LOW,
            canny_high: Self::DEFAULT_CANNY_HIGH,
        }
    }
}

fn check_range<T: PartialOrd + std::fmt::Display>(
    filter: FilterKind,
    parameter: &'static str,
    value: T,
    range: &RangeInclusive<T>,
) -> Result<(), InvalidParameter> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(InvalidParameter::new(
            filter,
            parameter,
            format!("must be in {}..={}, got {value}", range.start(), range.end()),
        ))
    }
}

fn check_kernel(
    filter: FilterKind,
    kernel_size: u32,
    range: &RangeInclusive<u32>,
) -> Result<(), InvalidParameter> {
    check_range(filter, "kernel_size", kernel_size, range)?;
    if kernel_size % 2 == 0 {
        return Err(InvalidParameter::new(
            filter,
            "kernel_size",
            format!("must be odd, got {kernel_size}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_selects_nothing() {
        let selection = FilterSelection::default();
        assert_eq!(selection.enabled_count(), 0);
        assert!(selection.to_specs().unwrap().is_empty());
    }

    #[test]
    fn all_lists_specs_in_selection_order() {
        let specs = FilterSelection::all().to_specs().unwrap();
        let kinds: Vec<_> = specs.iter().map(FilterSpec::kind).collect();
        assert_eq!(kinds, FilterKind::ALL);
        assert_eq!(
            specs[3],
            FilterSpec::Canny {
                low_threshold: 100,
                high_threshold: 200
            }
        );
    }

    #[test]
    fn even_kernel_rejected() {
        let selection = FilterSelection {
            enable_median_blur: true,
            median_kernel_size: 4,
            ..FilterSelection::default()
        };
        let err = selection.to_specs().unwrap_err();
        assert_eq!(err.filter, FilterKind::MedianBlur);
        assert_eq!(err.parameter, "kernel_size");
    }

    #[test]
    fn gaussian_kernel_above_range_rejected() {
        let selection = FilterSelection {
            enable_gaussian_blur: true,
            gaussian_kernel_size: 23,
            ..FilterSelection::default()
        };
        let err = selection.to_specs().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid kernel_size for Gaussian blur: must be in 3..=21, got 23"
        );
    }

    #[test]
    fn sigma_outside_range_rejected() {
        for sigma in [0.05, 10.5, f32::NAN] {
            let selection = FilterSelection {
                enable_gaussian_blur: true,
                gaussian_sigma: sigma,
                ..FilterSelection::default()
            };
            assert_eq!(selection.to_specs().unwrap_err().parameter, "sigma");
        }
    }

    #[test]
    fn threshold_outside_range_rejected() {
        let selection = FilterSelection {
            enable_canny: true,
            canny_high: 300,
            ..FilterSelection::default()
        };
        assert_eq!(selection.to_specs().unwrap_err().parameter, "high_threshold");
    }

    #[test]
    fn disabled_filters_are_not_validated() {
        let selection = FilterSelection {
            enable_box_blur: true,
            median_kernel_size: 4,
            gaussian_sigma: -1.0,
            canny_low: -5,
            ..FilterSelection::default()
        };
        assert_eq!(
            selection.to_specs().unwrap(),
            vec![FilterSpec::BoxBlur { kernel_size: 5 }]
        );
    }

    #[test]
    fn ui_ranges_pass_spec_validation() {
        let selection = FilterSelection {
            box_kernel_size: 29,
            median_kernel_size: 3,
            gaussian_kernel_size: 21,
            gaussian_sigma: 0.1,
            canny_low: 255,
            canny_high: 0,
            ..FilterSelection::all()
        };
        for spec in selection.to_specs().unwrap() {
            assert!(spec.validate().is_ok(), "{spec:?}");
        }
    }

    #[test]
    fn partial_json_fills_defaults() {
        let selection: FilterSelection =
            serde_json::from_str(r#"{"enable_canny": true, "canny_low": 20}"#).unwrap();
        assert!(selection.enable_canny);
        assert_eq!(selection.canny_low, 20);
        assert_eq!(selection.canny_high, FilterSelection::DEFAULT_CANNY_HIGH);
        assert!(!selection.enable_box_blur);
    }

    #[test]
    fn serde_round_trip() {
        let selection = FilterSelection {
            gaussian_sigma: 2.5,
            box_kernel_size: 7,
            ..FilterSelection::all()
        };
        let json = serde_json::to_string(&selection).unwrap();
        let back: FilterSelection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, selection);
    }
}
