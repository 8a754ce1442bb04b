use thiserror::Error;
use zip::result::ZipError;

/// Everything that aborts an upload. No partial dataset survives one of these.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("no input files given")]
    NoInput,

    #[error("unsupported input {0}: please select a ZIP or CSV file")]
    UnsupportedInput(String),

    #[error("a ZIP archive must be uploaded on its own, got {0} inputs")]
    MixedInput(usize),

    #[error("no CSV files found in ZIP archive {0}")]
    EmptyArchive(String),

    #[error("invalid ZIP file {name}: {source}")]
    Archive {
        name: String,
        #[source]
        source: ZipError,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error in {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error("reader task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
