use std::io::{Cursor, Read};
use tracing::{debug, trace};
use zip::ZipArchive;

use super::error::IngestError;

/// Pseudo-directory macOS adds to archives; never holds real exports.
const MACOS_METADATA_DIR: &str = "__MACOSX";

/// Upper bound on the buffer pre-allocated from an entry's declared size.
const MAX_PREALLOC: u64 = 1 << 20;

/// Open an in-memory ZIP and buffer every `.csv` entry, in archive order.
///
/// Returns `(base name, bytes)` pairs. Entries under `__MACOSX`, directories
/// and non-CSV files are skipped.
pub fn read_csv_entries(
    archive_name: &str,
    data: Vec<u8>,
) -> Result<Vec<(String, Vec<u8>)>, IngestError> {
    let archive_err = |source| IngestError::Archive {
        name: archive_name.to_string(),
        source,
    };
    let mut archive = ZipArchive::new(Cursor::new(data)).map_err(archive_err)?;

    let mut buffers = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(archive_err)?;
        let path = entry.name().to_string();

        if !entry.is_file() || !is_csv_entry(&path) {
            trace!(entry = %path, "skipping archive entry");
            continue;
        }

        let mut buf = Vec::with_capacity(prealloc_hint(entry.size()));
        entry
            .read_to_end(&mut buf)
            .map_err(|source| IngestError::Io {
                path: format!("{}:{}", archive_name, path),
                source,
            })?;
        debug!(entry = %path, bytes = buf.len(), "buffered archive entry");
        buffers.push((entry_base_name(&path).to_string(), buf));
    }

    Ok(buffers)
}

fn is_csv_entry(path: &str) -> bool {
    path.to_lowercase().ends_with(".csv")
        && !path.split('/').any(|part| part == MACOS_METADATA_DIR)
}

fn prealloc_hint(declared: u64) -> usize {
    declared.min(MAX_PREALLOC) as usize
}

fn entry_base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
