//! Per-user session state: the normalized table for the current upload, the filter choices, and
//! the filtered view derived from both.
//!
//! The normalized table is keyed by a [`Fingerprint`] of the upload's content. Re-submitting the
//! same file reuses it without re-parsing; a different file replaces it. Changing filters or the
//! file drops the cached view. Sessions share nothing; each owns its table.

use std::fmt;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::config::PipelineOptions;
use crate::error::{ExportError, ExportResult};
use crate::export::{self, ExportBundle};
use crate::ingestion::{load, Diagnostic, IngestionObserver, IngestionOptions, UploadedFile};
use crate::processing::{apply_filters, compute_metrics, normalize, FilterOptions, FilterSet, MetricsRecord};
use crate::types::DataSet;

/// SHA-256 of an upload's lowercased extension and content.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(file: &UploadedFile) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(file.extension().as_bytes());
        hasher.update([0u8]);
        hasher.update(&file.bytes);
        Self(hasher.finalize().into())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0[..8] {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

struct CachedTable {
    fingerprint: Fingerprint,
    table: Arc<DataSet>,
}

/// What happened to an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The file was parsed and normalized.
    Loaded { rows: usize },
    /// Same content as the cached table; nothing was re-parsed.
    Reused { rows: usize },
    /// No file: the session is awaiting input.
    Cleared,
    /// Ingestion failed; the session is awaiting input.
    Failed(Diagnostic),
}

/// Interactive session over one uploaded ticket export.
pub struct Session {
    options: PipelineOptions,
    ingestion: IngestionOptions,
    cached: Option<CachedTable>,
    filters: FilterSet,
    view: Option<Arc<DataSet>>,
    parses: usize,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("fingerprint", &self.cached.as_ref().map(|c| c.fingerprint))
            .field("filters", &self.filters)
            .field("view_cached", &self.view.is_some())
            .field("parses", &self.parses)
            .finish()
    }
}

impl Session {
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            ingestion: IngestionOptions::default(),
            cached: None,
            filters: FilterSet::default(),
            view: None,
            parses: 0,
        }
    }

    /// Attach an observer for ingestion, duration and export diagnostics.
    pub fn with_observer(mut self, observer: Arc<dyn IngestionObserver>) -> Self {
        self.ingestion.observer = Some(observer);
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Number of times a file was actually parsed and normalized.
    pub fn parse_count(&self) -> usize {
        self.parses
    }

    /// Submit the current upload (or `None` when the upload was removed).
    pub fn upload(&mut self, file: Option<&UploadedFile>) -> UploadOutcome {
        let Some(file) = file else {
            self.reset();
            return UploadOutcome::Cleared;
        };

        let fingerprint = Fingerprint::of(file);
        if let Some(cached) = self.cached.as_ref().filter(|c| c.fingerprint == fingerprint) {
            return UploadOutcome::Reused {
                rows: cached.table.row_count(),
            };
        }

        self.reset();
        let outcome = load(Some(file), &self.options, &self.ingestion);
        if let Some(diagnostic) = outcome.diagnostic {
            return UploadOutcome::Failed(diagnostic);
        }

        self.parses += 1;
        let table = Arc::new(normalize(outcome.table));
        let rows = table.row_count();
        self.cached = Some(CachedTable { fingerprint, table });
        UploadOutcome::Loaded { rows }
    }

    /// The normalized table, if a file is loaded.
    pub fn table(&self) -> Option<Arc<DataSet>> {
        self.cached.as_ref().map(|c| Arc::clone(&c.table))
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Replace the filter choices; the filtered view is recomputed on next use.
    pub fn set_filters(&mut self, filters: FilterSet) {
        if filters != self.filters {
            self.filters = filters;
            self.view = None;
        }
    }

    /// The filtered view; empty when no file is loaded.
    pub fn view(&mut self) -> Arc<DataSet> {
        if let Some(view) = &self.view {
            return Arc::clone(view);
        }
        let view = match &self.cached {
            Some(c) if self.filters.is_noop() => Arc::clone(&c.table),
            Some(c) => Arc::new(apply_filters(&c.table, &self.filters)),
            None => Arc::new(DataSet::empty()),
        };
        self.view = Some(Arc::clone(&view));
        view
    }

    /// Selector lists for the filter controls, given the current choices.
    pub fn filter_options(&self) -> FilterOptions {
        match &self.cached {
            Some(c) => FilterOptions::progressive(&c.table, &self.filters),
            None => FilterOptions::default(),
        }
    }

    /// Metrics over the filtered view; invalid durations are reported to the observer.
    pub fn metrics(&mut self) -> MetricsRecord {
        let view = self.view();
        let metrics = compute_metrics(&view, &self.options);
        if !metrics.ignored_durations.is_empty() {
            if let Some(obs) = &self.ingestion.observer {
                obs.on_invalid_durations(&metrics.ignored_durations);
            }
        }
        metrics
    }

    /// Fresh CSV/XLSX downloads of the filtered view.
    pub fn export(&mut self) -> ExportResult<ExportBundle> {
        let view = self.view();
        let result = export::export(&view, &self.options);
        if let (Err(ExportError::MissingColumns { missing }), Some(obs)) =
            (&result, &self.ingestion.observer)
        {
            obs.on_export_failure(missing);
        }
        result
    }

    fn reset(&mut self) {
        self.cached = None;
        self.view = None;
    }
}
