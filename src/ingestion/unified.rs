//! Unified ingestion entrypoint.
//!
//! [`ingest_bytes`] turns an uploaded file into a [`DataSet`] or an [`IngestionError`].
//! [`load`] wraps it with the soft-failure contract used by interactive callers: no file yields
//! an empty table, any failure yields an empty table plus a [`Diagnostic`], and success yields
//! no diagnostic.
//!
//! - If [`IngestionOptions::format`] is `None`, the format is inferred from the file name.
//! - If an [`super::observability::IngestionObserver`] is provided, success/failure/alerts are
//!   reported to it.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::config::PipelineOptions;
use crate::error::{FailureKind, IngestionError, IngestionResult};
use crate::types::DataSet;

use super::csv;
use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Delimited text.
    Csv,
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Excel,
}

impl IngestionFormat {
    /// Parse an ingestion format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// An uploaded file: its name (carrying the extension) and its content.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Lowercased extension of the file name; empty when there is none.
    pub fn extension(&self) -> String {
        Path::new(&self.name)
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default()
    }
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// If `None`, auto-detect format from the file extension.
    pub format: Option<IngestionFormat>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked. Defaults to
    /// [`IngestionSeverity::Error`], so failed uploads alert and unsupported extensions do not.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            observer: None,
            alert_at_or_above: IngestionSeverity::Error,
        }
    }
}

/// Human-readable report of a failed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&IngestionError> for Diagnostic {
    fn from(e: &IngestionError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

/// Result of [`load`]: always a table, plus a diagnostic when ingestion failed.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub table: DataSet,
    pub diagnostic: Option<Diagnostic>,
}

/// Load an optional upload with soft-failure semantics.
///
/// - `None` returns an empty table and no diagnostic ("awaiting input").
/// - A failure returns an empty table and the failure's [`Diagnostic`].
///
/// ```rust
/// use ticket_insights::config::PipelineOptions;
/// use ticket_insights::error::FailureKind;
/// use ticket_insights::ingestion::{load, IngestionOptions, UploadedFile};
///
/// let pipeline = PipelineOptions::default();
/// let opts = IngestionOptions::default();
///
/// let awaiting = load(None, &pipeline, &opts);
/// assert!(awaiting.table.is_empty() && awaiting.diagnostic.is_none());
///
/// let pdf = UploadedFile::new("tickets.pdf", b"%PDF".to_vec());
/// let out = load(Some(&pdf), &pipeline, &opts);
/// assert!(out.table.is_empty());
/// assert_eq!(out.diagnostic.unwrap().kind, FailureKind::UnsupportedFormat);
/// ```
pub fn load(
    file: Option<&UploadedFile>,
    pipeline: &PipelineOptions,
    options: &IngestionOptions,
) -> LoadOutcome {
    let Some(file) = file else {
        return LoadOutcome {
            table: DataSet::empty(),
            diagnostic: None,
        };
    };

    match ingest_bytes(file, pipeline, options) {
        Ok(table) => LoadOutcome {
            table,
            diagnostic: None,
        },
        Err(e) => LoadOutcome {
            table: DataSet::empty(),
            diagnostic: Some(Diagnostic::from(&e)),
        },
    }
}

/// Ingest an uploaded file into an in-memory [`DataSet`].
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row count and encoding
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
pub fn ingest_bytes(
    file: &UploadedFile,
    pipeline: &PipelineOptions,
    options: &IngestionOptions,
) -> IngestionResult<DataSet> {
    let ext = file.extension();
    let fmt = options.format.or_else(|| IngestionFormat::from_extension(&ext));

    let ctx = IngestionContext {
        file_name: file.name.clone(),
        format: fmt,
    };

    let result = match fmt {
        Some(IngestionFormat::Csv) => csv::ingest_csv_from_bytes(&file.bytes, pipeline)
            .map(|(ds, encoding)| (ds, Some(encoding))),
        Some(IngestionFormat::Excel) => ingest_excel_dispatch(&file.bytes, pipeline).map(|ds| (ds, None)),
        None => Err(IngestionError::UnsupportedFormat { extension: ext }),
    };

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok((ds, encoding)) => obs.on_success(
                &ctx,
                IngestionStats {
                    rows: ds.row_count(),
                    encoding: *encoding,
                },
            ),
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result.map(|(ds, _)| ds)
}

fn severity_for_error(e: &IngestionError) -> IngestionSeverity {
    match e.kind() {
        FailureKind::DecodeFailure | FailureKind::ParseFailure => IngestionSeverity::Error,
        FailureKind::UnsupportedFormat => IngestionSeverity::Warning,
    }
}

fn ingest_excel_dispatch(bytes: &[u8], pipeline: &PipelineOptions) -> IngestionResult<DataSet> {
    #[cfg(feature = "excel")]
    {
        super::excel::ingest_excel_from_bytes(bytes, pipeline)
    }

    #[cfg(not(feature = "excel"))]
    {
        let _ = (bytes, pipeline);
        Err(IngestionError::Spreadsheet {
            message: "excel ingestion not enabled (enable cargo feature 'excel')".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(UploadedFile::new("Tickets.XLSX", Vec::new()).extension(), "xlsx");
        assert_eq!(UploadedFile::new("noext", Vec::new()).extension(), "");
    }

    #[test]
    fn formats_from_extension() {
        assert_eq!(IngestionFormat::from_extension("CSV"), Some(IngestionFormat::Csv));
        assert_eq!(IngestionFormat::from_extension("xls"), Some(IngestionFormat::Excel));
        assert_eq!(IngestionFormat::from_extension("txt"), None);
    }

    #[test]
    fn success_produces_no_diagnostic() {
        let file = UploadedFile::new("t.csv", "Uf\nSP\n".as_bytes().to_vec());
        let out = load(Some(&file), &PipelineOptions::default(), &IngestionOptions::default());
        assert_eq!(out.table.row_count(), 1);
        assert!(out.diagnostic.is_none());
    }

    #[test]
    fn default_threshold_alerts_on_failed_uploads() {
        assert_eq!(IngestionOptions::default().alert_at_or_above, IngestionSeverity::Error);
        assert!(severity_for_error(&IngestionError::Decode {
            tried: "utf-8".to_string(),
            last_error: "bad".to_string(),
        }) >= IngestionOptions::default().alert_at_or_above);
        assert!(severity_for_error(&IngestionError::UnsupportedFormat {
            extension: "pdf".to_string(),
        }) < IngestionOptions::default().alert_at_or_above);
    }

    #[test]
    fn forced_format_overrides_extension() {
        let file = UploadedFile::new("export.txt", "Uf\nSP\n".as_bytes().to_vec());
        let opts = IngestionOptions {
            format: Some(IngestionFormat::Csv),
            ..Default::default()
        };
        let ds = ingest_bytes(&file, &PipelineOptions::default(), &opts).unwrap();
        assert_eq!(ds.row_count(), 1);
    }
}
