// src/ingest/mod.rs
pub mod archive;
pub mod error;
pub mod raw_table;
pub mod table;

pub use error::IngestError;
pub use raw_table::{ParsedDatasets, RawTable};

use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::{info, instrument, warn};

/// What a single input path holds, decided from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Archive,
    Csv,
}

impl InputKind {
    pub fn detect(path: &Path) -> Option<Self> {
        let name = display_name(path).to_lowercase();
        if name.ends_with(".zip") {
            Some(InputKind::Archive)
        } else if name.ends_with(".csv") {
            Some(InputKind::Csv)
        } else {
            None
        }
    }
}

/// A CSV file as loaded, with the name it had before lower-casing.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedFile {
    pub name: String,
    pub table: RawTable,
}

/// Everything one upload produced. Built fresh per upload and never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct Upload {
    /// File name of the archive, or of the first CSV.
    pub source: String,
    pub kind: InputKind,
    pub files: Vec<LoadedFile>,
}

impl Upload {
    /// Lower-cased filename → table view used by the classifier. When two
    /// files share a name, the one loaded first is used.
    pub fn datasets(&self) -> ParsedDatasets<'_> {
        let mut datasets = ParsedDatasets::new();
        for file in &self.files {
            if !datasets.insert(&file.name, &file.table) {
                warn!(file = %file.name, "duplicate file name; keeping the first one");
            }
        }
        datasets
    }

    pub fn status(&self) -> String {
        match self.kind {
            InputKind::Archive => format!(
                "✓ Loaded {} CSV file(s) from {}",
                self.files.len(),
                self.source
            ),
            InputKind::Csv => format!("✓ Loaded {} CSV file(s)", self.files.len()),
        }
    }
}

/// Read one ZIP or one-or-more CSV files into an [`Upload`].
///
/// Each CSV is parsed on the blocking pool; results are collected in input
/// order (archive listing order for ZIPs). The first failure aborts the whole
/// upload.
#[instrument(level = "info", skip(paths), fields(inputs = paths.len()))]
pub async fn load_upload(paths: &[PathBuf]) -> Result<Upload, IngestError> {
    let first = paths.first().ok_or(IngestError::NoInput)?;

    let mut kinds = Vec::with_capacity(paths.len());
    for path in paths {
        let kind = InputKind::detect(path)
            .ok_or_else(|| IngestError::UnsupportedInput(display_name(path).to_string()))?;
        kinds.push(kind);
    }
    if paths.len() > 1 && kinds.contains(&InputKind::Archive) {
        return Err(IngestError::MixedInput(paths.len()));
    }

    let source = display_name(first).to_string();
    let kind = kinds[0];

    let buffers = match kind {
        InputKind::Archive => {
            let data = read_file(first).await?;
            let archive_name = source.clone();
            let entries =
                task::spawn_blocking(move || archive::read_csv_entries(&archive_name, data))
                    .await??;
            if entries.is_empty() {
                return Err(IngestError::EmptyArchive(source));
            }
            entries
        }
        InputKind::Csv => {
            let mut buffers = Vec::with_capacity(paths.len());
            for path in paths {
                buffers.push((display_name(path).to_string(), read_file(path).await?));
            }
            buffers
        }
    };

    let files = parse_all(buffers).await?;
    info!(source = %source, files = files.len(), "upload loaded");

    Ok(Upload {
        source,
        kind,
        files,
    })
}

/// Spawn one parse task per buffer, then await them in submission order.
async fn parse_all(buffers: Vec<(String, Vec<u8>)>) -> Result<Vec<LoadedFile>, IngestError> {
    let mut handles = Vec::with_capacity(buffers.len());
    for (name, data) in buffers {
        handles.push(task::spawn_blocking(move || {
            let table = table::parse_csv(&name, &data)?;
            Ok::<_, IngestError>(LoadedFile { name, table })
        }));
    }

    let mut files = Vec::with_capacity(handles.len());
    for handle in handles {
        files.push(handle.await??);
    }
    Ok(files)
}

async fn read_file(path: &Path) -> Result<Vec<u8>, IngestError> {
    tokio::fs::read(path).await.map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn display_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_else(|| path.to_str().unwrap_or_default())
}
