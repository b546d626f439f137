use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Convenience result type for option loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Coarse classification of ingestion failures, as reported to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No candidate encoding produced a parseable delimited file.
    DecodeFailure,
    /// The file extension is not a supported input format.
    UnsupportedFormat,
    /// The spreadsheet reader rejected the file.
    ParseFailure,
}

/// Error type returned by ingestion functions.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Every candidate encoding failed to decode or parse the delimited text.
    #[error("could not decode delimited file (tried {tried}): {last_error}")]
    Decode { tried: String, last_error: String },

    /// The declared extension is not a recognized input format.
    #[error("unsupported file format '{extension}'")]
    UnsupportedFormat { extension: String },

    #[cfg(feature = "excel")]
    /// Spreadsheet reader error.
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// The spreadsheet opened but has no usable content.
    #[error("spreadsheet error: {message}")]
    Spreadsheet { message: String },
}

impl IngestionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Decode { .. } => FailureKind::DecodeFailure,
            Self::UnsupportedFormat { .. } => FailureKind::UnsupportedFormat,
            #[cfg(feature = "excel")]
            Self::Excel(_) => FailureKind::ParseFailure,
            Self::Spreadsheet { .. } => FailureKind::ParseFailure,
        }
    }
}

/// Error type returned by export functions.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Required columns are absent from the table; lists every missing name in required order.
    #[error("missing required columns: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// CSV serialization error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Buffer I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Spreadsheet writer error.
    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Error type returned when loading [`crate::config::PipelineOptions`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid options json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid options: {message}")]
    Invalid { message: String },
}
