//! Deterministic ZIP serialization.
//!
//! Entries are Deflate-compressed and stamped 1980-01-01 00:00:00 (the
//! DOS epoch); no permissions or extra fields are recorded. The same
//! entries in the same order always produce the same bytes.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::bundle::ExportEntry;

/// Conventional download name for the archive.
pub const ARCHIVE_FILE_NAME: &str = "processed_images.zip";

/// MIME type to serve the archive with.
pub const ARCHIVE_MIME_TYPE: &str = "application/zip";

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
}

/// Write `entries`, in order, into an in-memory ZIP archive.
///
/// # Errors
///
/// Returns the writer's error if an entry cannot be started or written.
pub fn write_zip(entries: &[ExportEntry]) -> Result<Vec<u8>, zip::result::ZipError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = entry_options();
    for entry in entries {
        writer.start_file(entry.file_name.as_str(), options)?;
        writer.write_all(&entry.bytes)?;
    }
    Ok(writer.finish()?.into_inner())
}
