//! medfilter-export: Export bundle builder (sans-IO)
//!
//! Encodes every [`FilterResult`](medfilter_pipeline::FilterResult) of a
//! run as PNG and packs the entries, in run order, into a single ZIP
//! archive. Identical results always give a byte-identical archive.

pub mod archive;
pub mod bundle;

pub use archive::{ARCHIVE_FILE_NAME, ARCHIVE_MIME_TYPE, write_zip};
pub use bundle::{ExportBundle, ExportEntry, ExportError, entry_file_name};

use medfilter_pipeline::FilterResult;

/// Encode `results` and return the finished archive bytes.
///
/// # Errors
///
/// See [`ExportBundle::from_results`] and [`ExportBundle::to_zip`].
pub fn export_archive(results: &[FilterResult]) -> Result<Vec<u8>, ExportError> {
    ExportBundle::from_results(results)?.to_zip()
}
