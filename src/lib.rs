//! `ticket-insights` ingests a service-ticket export (semicolon-delimited text or a spreadsheet),
//! normalizes its inconsistent values, and computes service-level metrics, filtered views and
//! column-projected exports over it.
//!
//! The pipeline, leaf-first:
//!
//! 1. [`ingestion`]: bytes + extension → [`types::DataSet`]. Delimited text is decoded by trying
//!    each candidate encoding in order; spreadsheets are read from their first sheet.
//! 2. [`processing::normalize`]: the opened/closed columns become dates (day-first), and every
//!    other column has its missing cells replaced by [`NOT_INFORMED`].
//! 3. [`processing::apply_filters`]: region/status/type/opened-date narrowing into a new view.
//! 4. [`processing::compute_metrics`] and [`export::export`], both reading the same view.
//!
//! [`session::Session`] wires these together and keeps the normalized table cached per upload.
//!
//! ## What the input looks like
//!
//! A header row naming the ticket columns (see [`types::TicketField::header`]), e.g.
//!
//! ```text
//! OrdemDeServico;StatusDaOS;DataPrimeiroAtendimento;DataDeFechamento;SLADeSolucaoAtendido
//! 1001;Fechado;01/03/2024;06/03/2024;Sim
//! 1002;Aberto;02/03/2024;;Não
//! ```
//!
//! Columns may appear in any order; extra columns are carried along; absent columns simply
//! disable whatever depends on them.
//!
//! ## Quick example
//!
//! ```rust
//! use ticket_insights::config::PipelineOptions;
//! use ticket_insights::ingestion::UploadedFile;
//! use ticket_insights::session::{Session, UploadOutcome};
//!
//! let csv = "StatusDaOS;SLADeSolucaoAtendido\nFechado;Sim\nAberto;Não\nencerrada ;xyz\n";
//! let file = UploadedFile::new("tickets.csv", csv.as_bytes().to_vec());
//!
//! let mut session = Session::new(PipelineOptions::default());
//! assert_eq!(session.upload(Some(&file)), UploadOutcome::Loaded { rows: 3 });
//!
//! let m = session.metrics();
//! assert_eq!(m.closed_tickets, 2);
//! assert_eq!(m.sla_met_percentage, 50.0);
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: upload loading, encoding fallback, format-specific readers, observers
//! - [`types`]: schema + in-memory dataset types and the ticket field map
//! - [`processing`]: normalization, filters, metrics and dashboard aggregates
//! - [`export`]: projection onto the export columns and CSV/XLSX serialization
//! - [`session`]: fingerprint-keyed session cache
//! - [`config`]: tunable vocabularies and constants
//! - [`error`]: error types

pub mod config;
pub mod dates;
pub mod error;
pub mod export;
pub mod ingestion;
pub mod processing;
pub mod session;
pub mod types;

pub use error::{ExportError, FailureKind, IngestionError, IngestionResult};
pub use types::NOT_INFORMED;
