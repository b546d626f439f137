use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::error::IngestionError;
use crate::processing::metrics::InvalidDuration;

use super::encoding::TextEncoding;
use super::unified::IngestionFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    /// Informational event.
    Info,
    /// Data-quality warning; processing continues.
    Warning,
    /// The operation failed and returned to its awaiting state.
    Error,
    /// Above every severity the pipeline emits; as a threshold it silences alerts.
    Critical,
}

/// Context about an ingestion attempt.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// Name of the uploaded file.
    pub file_name: String,
    /// Format chosen from the extension, if recognized.
    pub format: Option<IngestionFormat>,
}

/// Minimal stats reported on successful ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Number of ingested rows.
    pub rows: usize,
    /// Encoding that decoded delimited input; `None` for spreadsheets.
    pub encoding: Option<TextEncoding>,
}

/// Observer interface for pipeline outcomes.
///
/// Implementors can record metrics, logs, or surface diagnostics to users.
pub trait IngestionObserver: Send + Sync {
    /// Called when ingestion succeeds.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when ingestion fails.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {}

    /// Called when an ingestion failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.on_failure(ctx, severity, error)
    }

    /// Called when metric computation excluded rows with an out-of-range duration.
    fn on_invalid_durations(&self, _rows: &[InvalidDuration]) {}

    /// Called when an export was refused because required columns are absent.
    fn on_export_failure(&self, _missing: &[String]) {}
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }

    fn on_invalid_durations(&self, rows: &[InvalidDuration]) {
        for o in &self.observers {
            o.on_invalid_durations(rows);
        }
    }

    fn on_export_failure(&self, missing: &[String]) {
        for o in &self.observers {
            o.on_export_failure(missing);
        }
    }
}

/// Logs pipeline events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl IngestionObserver for StdErrObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        eprintln!("[ingest][ok] {}", success_line(ctx, stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        eprintln!("[ingest][{severity:?}] {}", failure_line(ctx, error));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        eprintln!("[ALERT][ingest][{severity:?}] {}", failure_line(ctx, error));
    }

    fn on_invalid_durations(&self, rows: &[InvalidDuration]) {
        eprintln!("[metrics][Warning] {}", durations_line(rows));
    }

    fn on_export_failure(&self, missing: &[String]) {
        eprintln!("[export][Error] missing columns: {missing:?}");
    }
}

/// Appends pipeline events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{} {line}", Utc::now().to_rfc3339());
        }
    }
}

impl IngestionObserver for FileObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.append_line(&format!("ok {}", success_line(ctx, stats)));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.append_line(&format!(
            "fail severity={severity:?} {}",
            failure_line(ctx, error)
        ));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.append_line(&format!(
            "ALERT severity={severity:?} {}",
            failure_line(ctx, error)
        ));
    }

    fn on_invalid_durations(&self, rows: &[InvalidDuration]) {
        self.append_line(&format!("warn {}", durations_line(rows)));
    }

    fn on_export_failure(&self, missing: &[String]) {
        self.append_line(&format!("export-fail missing={missing:?}"));
    }
}

fn success_line(ctx: &IngestionContext, stats: IngestionStats) -> String {
    format!(
        "format={:?} file={} rows={} encoding={}",
        ctx.format,
        ctx.file_name,
        stats.rows,
        stats.encoding.map(TextEncoding::label).unwrap_or("-")
    )
}

fn failure_line(ctx: &IngestionContext, error: &IngestionError) -> String {
    format!(
        "kind={:?} format={:?} file={} err={}",
        error.kind(),
        ctx.format,
        ctx.file_name,
        error
    )
}

fn durations_line(rows: &[InvalidDuration]) -> String {
    format!("{} rows ignored for invalid duration", rows.len())
}
