pub mod audit;
pub mod ingest;
pub mod preview;

pub use audit::{run, AuditOptions, AuditReport, Outcome, SkipReason};
pub use ingest::{load_upload, IngestError, Upload};
