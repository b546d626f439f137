//! Pipeline configuration.
//!
//! Every vocabulary list and constant the pipeline relies on lives in [`PipelineOptions`]. Use
//! [`Default`] for the stock ticket export, or load overrides from JSON; omitted keys keep their
//! defaults.
//!
//! ```rust
//! use ticket_insights::config::PipelineOptions;
//!
//! let opts = PipelineOptions::from_json_str(r#"{ "max_duration_days": 90 }"#).unwrap();
//! assert_eq!(opts.max_duration_days, 90);
//! assert_eq!(opts.delimiter, ';');
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};
use crate::ingestion::encoding::TextEncoding;
use crate::types::TicketField;

/// Status values (after trim + lowercase) that count as a closed ticket.
///
/// Accent variants are listed explicitly; no locale folding is applied.
pub const DEFAULT_CLOSED_STATUSES: &[&str] = &[
    "fechada",
    "encerrada",
    "finalizada",
    "concluída",
    "concluido",
    "fechado",
    "resolvida",
    "finalizado",
    "encerrado",
    "concluido com sucesso",
    "fechada com sucesso",
    "concluído",
    "fechado com sucesso",
];

/// Raw cell texts read as true-missing during ingestion.
pub const DEFAULT_MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Options controlling ingestion, metrics and export.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineOptions {
    /// Field delimiter for delimited text input and output.
    pub delimiter: char,
    /// Candidate encodings for delimited text, tried in order.
    pub encodings: Vec<TextEncoding>,
    /// Raw cell texts treated as missing.
    pub missing_markers: Vec<String>,
    /// Closed-set status vocabulary, compared after trim + lowercase.
    pub closed_statuses: Vec<String>,
    /// SLA tokens meaning "met" (compared after trim).
    pub sla_met_tokens: Vec<String>,
    /// SLA tokens meaning "not met" (compared after trim).
    pub sla_missed_tokens: Vec<String>,
    /// Upper bound (inclusive) of a duration that counts toward the average.
    pub max_duration_days: i64,
    /// Ordered column list for exports.
    pub export_columns: Vec<String>,
    /// Export file name prefix; a timestamp and extension are appended.
    pub export_file_stem: String,
    /// Number of bars in the status chart.
    pub top_status_limit: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            delimiter: ';',
            encodings: TextEncoding::DEFAULT_CANDIDATES.to_vec(),
            missing_markers: to_owned_list(DEFAULT_MISSING_MARKERS),
            closed_statuses: to_owned_list(DEFAULT_CLOSED_STATUSES),
            sla_met_tokens: to_owned_list(&["Sim", "1", "1.0"]),
            sla_missed_tokens: to_owned_list(&["Não", "0", "0.0"]),
            max_duration_days: 180,
            export_columns: Self::default_export_columns(),
            export_file_stem: "atendimento_filtrado".to_string(),
            top_status_limit: 10,
        }
    }
}

impl PipelineOptions {
    /// The 13 export columns, one per [`TicketField`], in export order.
    pub fn default_export_columns() -> Vec<String> {
        TicketField::ALL
            .iter()
            .map(|f| f.header().to_string())
            .collect()
    }

    /// The export list as historically shipped: client id and municipality were written as one
    /// token (`IdClienteMunicipio`), so projections against real headers report it missing.
    pub fn legacy_export_columns() -> Vec<String> {
        let mut cols = Vec::with_capacity(12);
        for f in TicketField::ALL {
            match f {
                TicketField::ClientId => cols.push(format!(
                    "{}{}",
                    TicketField::ClientId.header(),
                    TicketField::Municipality.header()
                )),
                TicketField::Municipality => {}
                other => cols.push(other.header().to_string()),
            }
        }
        cols
    }

    /// Parse options from a JSON document and validate them.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let opts: Self = serde_json::from_str(json)?;
        opts.validate()?;
        Ok(opts)
    }

    /// Read options from a JSON file and validate them.
    pub fn from_json_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.encodings.is_empty() {
            return Err(ConfigError::Invalid {
                message: "at least one candidate encoding is required".to_string(),
            });
        }
        if !self.delimiter.is_ascii() {
            return Err(ConfigError::Invalid {
                message: format!("delimiter must be a single ASCII character, got {:?}", self.delimiter),
            });
        }
        if self.export_columns.is_empty() {
            return Err(ConfigError::Invalid {
                message: "export column list is empty".to_string(),
            });
        }
        let mut seen = HashSet::new();
        for col in &self.export_columns {
            if !seen.insert(col.as_str()) {
                return Err(ConfigError::Invalid {
                    message: format!("export column '{col}' is listed twice"),
                });
            }
        }
        if self.max_duration_days < 0 {
            return Err(ConfigError::Invalid {
                message: "max_duration_days must not be negative".to_string(),
            });
        }
        Ok(())
    }

    /// Delimiter as the byte the CSV reader/writer expects. Validated to be ASCII.
    pub(crate) fn delimiter_byte(&self) -> u8 {
        u8::try_from(self.delimiter).unwrap_or(b';')
    }

    pub(crate) fn is_missing_marker(&self, raw: &str) -> bool {
        self.missing_markers.iter().any(|m| m == raw)
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
