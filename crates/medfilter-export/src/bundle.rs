//! Ordered bundle of encoded result images.

use medfilter_pipeline::{EncodeError, FilterResult, encode};

use crate::archive::write_zip;

/// Errors from building or serializing an [`ExportBundle`].
///
/// Any error aborts the whole export; a partial archive is never
/// returned.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// There were no results to export.
    #[error("nothing to export: the result list is empty")]
    Empty,

    /// One result could not be encoded.
    #[error("failed to encode {name:?}: {source}")]
    Encode {
        /// Display name of the result that failed.
        name: String,
        /// The underlying encoder error.
        source: EncodeError,
    },

    /// Two results would map to the same archive entry.
    #[error("duplicate archive entry {0:?}")]
    DuplicateEntry(String),

    /// The ZIP writer failed.
    #[error("failed to write archive: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// Archive entry name for a result's display name.
#[must_use]
pub fn entry_file_name(display_name: &str) -> String {
    format!("{display_name}.png")
}

/// One encoded image, named as it appears in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry {
    /// `<display name>.png`.
    pub file_name: String,
    /// PNG-encoded image.
    pub bytes: Vec<u8>,
}

/// Encoded results in run order, ready to be archived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBundle {
    entries: Vec<ExportEntry>,
}

impl ExportBundle {
    /// Encode each result as PNG, keeping the order of `results`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Empty`] for an empty slice,
    /// [`ExportError::DuplicateEntry`] if two results share a name, and
    /// [`ExportError::Encode`] for the first result that fails to encode.
    pub fn from_results(results: &[FilterResult]) -> Result<Self, ExportError> {
        if results.is_empty() {
            return Err(ExportError::Empty);
        }

        let mut entries: Vec<ExportEntry> = Vec::with_capacity(results.len());
        for result in results {
            let file_name = entry_file_name(&result.name);
            if entries.iter().any(|e| e.file_name == file_name) {
                return Err(ExportError::DuplicateEntry(file_name));
            }
            let bytes = encode(&result.image).map_err(|source| ExportError::Encode {
                name: result.name.clone(),
                source,
            })?;
            entries.push(ExportEntry { file_name, bytes });
        }

        tracing::info!(
            entries = entries.len(),
            encoded_bytes = entries.iter().map(|e| e.bytes.len()).sum::<usize>(),
            "export bundle assembled",
        );
        Ok(Self { entries })
    }

    /// Entries in archive order.
    #[must_use]
    pub fn entries(&self) -> &[ExportEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false` for a bundle built by [`from_results`](Self::from_results).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry's PNG bytes by file name.
    #[must_use]
    pub fn get(&self, file_name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.file_name == file_name)
            .map(|e| e.bytes.as_slice())
    }

    /// Serialize the bundle as a ZIP archive.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Archive`] if the ZIP writer fails.
    pub fn to_zip(&self) -> Result<Vec<u8>, ExportError> {
        let archive = write_zip(&self.entries)?;
        tracing::info!(
            entries = self.entries.len(),
            archive_bytes = archive.len(),
            "archive written",
        );
        Ok(archive)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use medfilter_pipeline::{Channels, FilterSpec, ImageBuffer, ORIGINAL_IMAGE_NAME, decode, run};

    use super::*;

    fn test_image() -> ImageBuffer {
        ImageBuffer::from_fn(6, 4, Channels::Rgb, |x, y, c| {
            u8::try_from((x * 40 + y * 25 + u32::try_from(c).unwrap() * 60) % 256).unwrap()
        })
    }

    #[test]
    fn entry_names_append_png() {
        assert_eq!(entry_file_name(ORIGINAL_IMAGE_NAME), "Original Image.png");
        assert_eq!(
            entry_file_name("Canny Algorithm Applied"),
            "Canny Algorithm Applied.png"
        );
    }

    #[test]
    fn empty_results_rejected() {
        assert!(matches!(
            ExportBundle::from_results(&[]),
            Err(ExportError::Empty)
        ));
    }

    #[test]
    fn bundle_has_one_entry_per_result_in_order() {
        let specs = [
            FilterSpec::MedianBlur { kernel_size: 3 },
            FilterSpec::Canny {
                low_threshold: 50,
                high_threshold: 150,
            },
        ];
        let results = run(&test_image(), &specs).unwrap();
        let bundle = ExportBundle::from_results(&results).unwrap();
        assert_eq!(bundle.len(), 3);
        let names: Vec<_> = bundle.entries().iter().map(|e| e.file_name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Original Image.png",
                "Median Blurred Image.png",
                "Canny Algorithm Applied.png",
            ]
        );
    }

    #[test]
    fn entries_decode_back_to_their_images() {
        let results = run(&test_image(), &[FilterSpec::BoxBlur { kernel_size: 3 }]).unwrap();
        let bundle = ExportBundle::from_results(&results).unwrap();
        for (result, entry) in results.iter().zip(bundle.entries()) {
            assert_eq!(decode(&entry.bytes).unwrap(), result.image);
        }
        assert!(bundle.get("Blurred Image.png").is_some());
        assert!(bundle.get("Missing.png").is_none());
    }

    #[test]
    fn duplicate_names_rejected() {
        let original = FilterResult::original(test_image());
        let err = ExportBundle::from_results(&[original.clone(), original]).unwrap_err();
        assert!(matches!(err, ExportError::DuplicateEntry(ref n) if n == "Original Image.png"));
    }

    #[test]
    fn encode_failure_names_the_result() {
        let empty = ImageBuffer::from_raw(0, 0, Channels::Gray, Vec::new()).unwrap();
        let results = [
            FilterResult::original(test_image()),
            FilterResult {
                name: "Broken".to_owned(),
                image: empty,
                spec: None,
            },
        ];
        let err = ExportBundle::from_results(&results).unwrap_err();
        assert!(matches!(err, ExportError::Encode { ref name, .. } if name == "Broken"));
    }
}
