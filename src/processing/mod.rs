//! In-memory ticket table transformations.
//!
//! The processing layer operates on [`crate::types::DataSet`] values produced by ingestion:
//!
//! - [`normalize()`]: date coercion for the opened/closed columns and `NOT_INFORMED` filling
//! - [`apply_filters()`]: region/status/type/opened-date narrowing
//! - [`compute_metrics()`]: counts, percentages and the average duration
//! - [`summary`]: tiles, chart series and selector lists
//!
//! ## Example: normalize → filter → metrics
//!
//! ```rust
//! use ticket_insights::config::PipelineOptions;
//! use ticket_insights::processing::{apply_filters, compute_metrics, normalize, FilterSet, Selection};
//! use ticket_insights::types::{DataSet, Schema, Value};
//!
//! let raw = DataSet::new(
//!     Schema::from_headers(["Uf", "StatusDaOS"]),
//!     vec![
//!         vec![Value::text("SP"), Value::text("Fechado")],
//!         vec![Value::text("SP"), Value::text("Aberto")],
//!         vec![Value::text("RJ"), Value::Null],
//!     ],
//! );
//! let table = normalize(raw);
//!
//! let filters = FilterSet { region: Selection::only("SP"), ..Default::default() };
//! let view = apply_filters(&table, &filters);
//!
//! let m = compute_metrics(&view, &PipelineOptions::default());
//! assert_eq!(m.total_tickets, 2);
//! assert_eq!(m.closed_tickets, 1);
//! assert_eq!(m.closed_percentage, 50.0);
//! ```

pub mod filter;
pub mod metrics;
pub mod normalize;
pub mod summary;

pub use filter::{apply_filters, DateFilter, FilterSet, Selection, ALL_LABEL};
pub use metrics::{compute_metrics, is_closed_status, parse_sla_token, InvalidDuration, MetricsRecord, SlaToken};
pub use normalize::normalize;
pub use summary::{monthly_openings, top_values, value_counts, ClosedBand, FilterOptions, MetricTiles};
