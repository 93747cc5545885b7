use crate::entry::ArchiveEntry;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Deflate, with every timestamp pinned to the ZIP epoch (1980-01-01) so the
/// same input always produces the same bytes.
fn options() -> FileOptions {
    FileOptions::default().compression_method(CompressionMethod::Deflated).last_modified_time(DateTime::default())
}

/// Writes a chapter's images into a ZIP, named by their sequence index.
pub fn pack(entries: &[ArchiveEntry]) -> Result<Vec<u8>> {
    let named: Vec<(String, &[u8])> = entries.iter().map(|entry| (entry.file_name(), entry.bytes.as_slice())).collect();
    pack_named(named.iter().map(|(name, bytes)| (name.as_str(), *bytes)))
}

/// Writes arbitrary named files into a ZIP, in iteration order.
///
/// Blocking and CPU-bound; call from `spawn_blocking` when on a runtime.
pub fn pack_named<'a>(files: impl IntoIterator<Item = (&'a str, &'a [u8])>) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in files {
        writer.start_file(name, options()).or_raise(|| ErrorKind::Write)?;
        writer.write_all(bytes).or_raise(|| ErrorKind::Write)?;
    }
    let cursor = writer.finish().or_raise(|| ErrorKind::Write)?;
    Ok(cursor.into_inner())
}
