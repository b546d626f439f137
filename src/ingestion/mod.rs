//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`load`] or [`ingest_bytes`] (from [`unified`]) which:
//!
//! - pick the format from the uploaded file's extension (or an override in [`IngestionOptions`])
//! - decode delimited text by trying each configured [`encoding::TextEncoding`] in order
//! - report success/failure/alerts to an optional [`IngestionObserver`]
//!
//! Format-specific functions are also available under [`csv`] and (with the `excel` feature)
//! `excel`.

pub mod csv;
pub mod encoding;
#[cfg(feature = "excel")]
pub mod excel;
pub mod observability;
pub mod unified;

pub use encoding::TextEncoding;
pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    StdErrObserver,
};
pub use unified::{
    ingest_bytes, load, Diagnostic, IngestionFormat, IngestionOptions, LoadOutcome, UploadedFile,
};
