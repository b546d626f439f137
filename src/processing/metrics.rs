//! Service-level metrics over a (possibly filtered) ticket table.
//!
//! [`compute_metrics`] is total: empty tables, absent columns, fully-null or fully-sentinel
//! columns all produce zeros rather than errors or NaN.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::config::PipelineOptions;
use crate::dates::{value_as_datetime, whole_days_between};
use crate::types::{DataSet, TicketField, Value};

/// Aggregate metrics for a ticket table.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MetricsRecord {
    pub total_tickets: usize,
    pub closed_tickets: usize,
    /// `closed_tickets / total_tickets * 100`, 0 for an empty table.
    pub closed_percentage: f64,
    /// Mean of recognized SLA tokens (met = 1, missed = 0) * 100; 0 when none are recognized.
    pub sla_met_percentage: f64,
    /// Mean whole-day duration over rows whose duration lies in `[0, max_duration_days]`.
    pub average_duration_days: f64,
    /// Rows excluded from the duration average, for operator inspection. The rows themselves
    /// stay in the table.
    pub ignored_durations: Vec<InvalidDuration>,
}

impl MetricsRecord {
    pub fn ignored_count(&self) -> usize {
        self.ignored_durations.len()
    }
}

/// A row whose `ClosedAt - FirstResponseAt` falls outside the accepted range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidDuration {
    /// Zero-based row index within the table the metrics were computed on.
    pub row: usize,
    pub first_response_at: NaiveDateTime,
    pub closed_at: NaiveDateTime,
    pub duration_days: i64,
}

/// Tri-state reading of a free-text SLA cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaToken {
    Met,
    Missed,
    Unknown,
}

/// Map an SLA cell's text onto [`SlaToken`] using the configured token tables.
///
/// Text is trimmed, then matched exactly; anything unlisted (including [`crate::NOT_INFORMED`])
/// is [`SlaToken::Unknown`].
pub fn parse_sla_token(raw: &str, options: &PipelineOptions) -> SlaToken {
    let s = raw.trim();
    if options.sla_met_tokens.iter().any(|t| t == s) {
        SlaToken::Met
    } else if options.sla_missed_tokens.iter().any(|t| t == s) {
        SlaToken::Missed
    } else {
        SlaToken::Unknown
    }
}

/// Closed-set membership test: trim + lowercase, then exact match against the vocabulary.
pub fn is_closed_status(raw: &str, options: &PipelineOptions) -> bool {
    let key = status_key(raw);
    options.closed_statuses.iter().any(|s| status_key(s) == key)
}

fn status_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Compute the metrics record for `table`.
///
/// Dates are re-read from the cells here, so the table does not need to have been normalized.
pub fn compute_metrics(table: &DataSet, options: &PipelineOptions) -> MetricsRecord {
    let total_tickets = table.row_count();
    if total_tickets == 0 {
        return MetricsRecord::default();
    }

    let closed_tickets = count_closed(table, options);
    let closed_percentage = percentage(closed_tickets, total_tickets);
    let sla_met_percentage = sla_met_percentage(table, options);
    let (average_duration_days, ignored_durations) = durations(table, options);

    MetricsRecord {
        total_tickets,
        closed_tickets,
        closed_percentage,
        sla_met_percentage,
        average_duration_days,
        ignored_durations,
    }
}

fn percentage(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

fn count_closed(table: &DataSet, options: &PipelineOptions) -> usize {
    let Some(idx) = table.column(TicketField::Status) else {
        return 0;
    };
    let vocabulary: HashSet<String> = options
        .closed_statuses
        .iter()
        .map(|s| status_key(s))
        .collect();

    table
        .rows
        .iter()
        .filter_map(|row| row.get(idx))
        .filter(|v| matches!(v, Value::Utf8(s) if vocabulary.contains(&status_key(s))))
        .count()
}

fn sla_met_percentage(table: &DataSet, options: &PipelineOptions) -> f64 {
    let Some(idx) = table.column(TicketField::SlaMet) else {
        return 0.0;
    };

    let (met, recognized) = table
        .rows
        .iter()
        .filter_map(|row| match row.get(idx) {
            Some(Value::Utf8(s)) => Some(parse_sla_token(s, options)),
            _ => None,
        })
        .fold((0usize, 0usize), |(met, recognized), token| match token {
            SlaToken::Met => (met + 1, recognized + 1),
            SlaToken::Missed => (met, recognized + 1),
            SlaToken::Unknown => (met, recognized),
        });

    percentage(met, recognized)
}

fn durations(table: &DataSet, options: &PipelineOptions) -> (f64, Vec<InvalidDuration>) {
    let (Some(first_idx), Some(closed_idx)) = (
        table.column(TicketField::FirstResponseAt),
        table.column(TicketField::ClosedAt),
    ) else {
        return (0.0, Vec::new());
    };

    let mut sum = 0i64;
    let mut valid = 0usize;
    let mut ignored = Vec::new();

    for (row_idx, row) in table.rows.iter().enumerate() {
        let first = row.get(first_idx).and_then(value_as_datetime);
        let closed = row.get(closed_idx).and_then(value_as_datetime);
        let (Some(first), Some(closed)) = (first, closed) else {
            continue;
        };

        let days = whole_days_between(first, closed);
        if (0..=options.max_duration_days).contains(&days) {
            sum += days;
            valid += 1;
        } else {
            ignored.push(InvalidDuration {
                row: row_idx,
                first_response_at: first,
                closed_at: closed,
                duration_days: days,
            });
        }
    }

    let average = if valid == 0 {
        0.0
    } else {
        sum as f64 / valid as f64
    };
    (average, ignored)
}
