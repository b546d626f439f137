//! Dashboard aggregates: metric tiles, chart series and selector lists.
//!
//! These are the data behind the interactive views; rendering them is left to the caller.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::dates::value_as_datetime;
use crate::types::{DataSet, TicketField, Value};

use super::filter::{filter_selection, FilterSet, ALL_LABEL};
use super::metrics::MetricsRecord;

/// Qualitative band for the closed-ticket percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClosedBand {
    Good,
    Medium,
    Low,
}

impl ClosedBand {
    /// `>= 80` is good, `>= 50` medium, anything else low.
    pub fn from_percentage(pct: f64) -> Self {
        if pct >= 80.0 {
            Self::Good
        } else if pct >= 50.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Display-ready values for the five summary tiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricTiles {
    pub total_tickets: String,
    pub closed_tickets: String,
    pub closed_percentage: String,
    pub closed_band: ClosedBand,
    pub sla_met_percentage: String,
    pub average_duration: String,
}

impl From<&MetricsRecord> for MetricTiles {
    fn from(m: &MetricsRecord) -> Self {
        Self {
            total_tickets: m.total_tickets.to_string(),
            closed_tickets: m.closed_tickets.to_string(),
            closed_percentage: format!("{:.1}%", m.closed_percentage),
            closed_band: ClosedBand::from_percentage(m.closed_percentage),
            sla_met_percentage: format!("{:.1}%", m.sla_met_percentage),
            average_duration: format!("{:.1} days", m.average_duration_days),
        }
    }
}

/// Frequency of each distinct text value in `field`, most frequent first; ties keep the order in
/// which values first appear. Missing cells are not counted. Empty when the column is absent.
pub fn value_counts(table: &DataSet, field: TicketField) -> Vec<(String, usize)> {
    let Some(idx) = table.column(field) else {
        return Vec::new();
    };

    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for text in table.rows.iter().filter_map(|row| row.get(idx).and_then(Value::as_text)) {
        let text = text.into_owned();
        match counts.get_mut(&text) {
            Some(n) => *n += 1,
            None => {
                counts.insert(text.clone(), 1);
                order.push(text);
            }
        }
    }

    let mut out: Vec<(String, usize)> = order
        .into_iter()
        .map(|value| {
            let n = counts.get(&value).copied().unwrap_or(0);
            (value, n)
        })
        .collect();
    // Stable sort keeps first-seen order among equal counts.
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

/// The `limit` most frequent values of `field` (status bar chart).
pub fn top_values(table: &DataSet, field: TicketField, limit: usize) -> Vec<(String, usize)> {
    let mut counts = value_counts(table, field);
    counts.truncate(limit);
    counts
}

/// Tickets opened per calendar month (`YYYY-MM`), ascending. Rows without a parseable
/// `OpenedAt` are skipped.
pub fn monthly_openings(table: &DataSet) -> Vec<(String, usize)> {
    let Some(idx) = table.column(TicketField::OpenedAt) else {
        return Vec::new();
    };

    let mut months: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for dt in table.rows.iter().filter_map(|row| row.get(idx).and_then(value_as_datetime)) {
        *months.entry((dt.year(), dt.month())).or_insert(0) += 1;
    }

    months
        .into_iter()
        .map(|((y, m), n)| (format!("{y:04}-{m:02}"), n))
        .collect()
}

/// Selector contents for the filter controls.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FilterOptions {
    /// [`ALL_LABEL`] followed by distinct trimmed region codes, numeric codes first.
    pub regions: Vec<String>,
    /// [`ALL_LABEL`] followed by sorted distinct statuses.
    pub statuses: Vec<String>,
    /// [`ALL_LABEL`] followed by sorted distinct ticket types.
    pub order_types: Vec<String>,
    /// Min and max opened date, when any row has one.
    pub opened_bounds: Option<(NaiveDate, NaiveDate)>,
}

impl FilterOptions {
    /// Compute selector lists the way the dashboard narrows them: regions from the whole table,
    /// statuses after the region filter, types after region and status, and the date bounds
    /// after all three.
    pub fn progressive(table: &DataSet, filters: &FilterSet) -> Self {
        let regions = with_all(sorted_regions(table));

        let by_region = filter_selection(table, TicketField::State, &filters.region);
        let statuses = with_all(sorted_distinct(&by_region, TicketField::Status));

        let by_status = filter_selection(&by_region, TicketField::Status, &filters.status);
        let order_types = with_all(sorted_distinct(&by_status, TicketField::OrderType));

        let by_type = filter_selection(&by_status, TicketField::OrderType, &filters.order_type);
        let opened_bounds = opened_bounds(&by_type);

        Self {
            regions,
            statuses,
            order_types,
            opened_bounds,
        }
    }
}

/// Earliest and latest `OpenedAt` date present in `table`.
pub fn opened_bounds(table: &DataSet) -> Option<(NaiveDate, NaiveDate)> {
    let idx = table.column(TicketField::OpenedAt)?;
    let mut dates = table
        .rows
        .iter()
        .filter_map(|row| row.get(idx).and_then(value_as_datetime))
        .map(|dt| dt.date());
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

fn with_all(values: Vec<String>) -> Vec<String> {
    std::iter::once(ALL_LABEL.to_string()).chain(values).collect()
}

fn distinct_texts(table: &DataSet, field: TicketField, trim: bool) -> BTreeSet<String> {
    let Some(idx) = table.column(field) else {
        return BTreeSet::new();
    };
    table
        .rows
        .iter()
        .filter_map(|row| row.get(idx).and_then(Value::as_text))
        .map(|t| if trim { t.trim().to_string() } else { t.into_owned() })
        .collect()
}

fn sorted_distinct(table: &DataSet, field: TicketField) -> Vec<String> {
    distinct_texts(table, field, false).into_iter().collect()
}

/// Purely numeric codes sort ahead of the rest; each group sorts as plain strings.
fn sorted_regions(table: &DataSet) -> Vec<String> {
    let mut regions: Vec<String> = distinct_texts(table, TicketField::State, true)
        .into_iter()
        .collect();
    regions.sort_by_key(|r| !is_all_digits(r));
    regions
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::filter::Selection;
    use crate::types::Schema;

    fn sample() -> DataSet {
        DataSet::new(
            Schema::from_headers(["Uf", "StatusDaOS", "TipoOS", "DataDeAbertura"]),
            vec![
                vec![Value::text("SP"), Value::text("Aberto"), Value::text("Corretiva"), Value::text("10/01/2024")],
                vec![Value::text("35"), Value::text("Fechado"), Value::text("Preventiva"), Value::text("02/02/2024")],
                vec![Value::text(" BA"), Value::text("Fechado"), Value::text("Corretiva"), Value::Null],
                vec![Value::text("SP"), Value::text("Pendente"), Value::text("Instalação"), Value::text("28/02/2024")],
                vec![Value::text("12"), Value::text("Fechado"), Value::text("Corretiva"), Value::text("05/01/2024")],
            ],
        )
    }

    #[test]
    fn bands() {
        assert_eq!(ClosedBand::from_percentage(80.0), ClosedBand::Good);
        assert_eq!(ClosedBand::from_percentage(79.9), ClosedBand::Medium);
        assert_eq!(ClosedBand::from_percentage(50.0), ClosedBand::Medium);
        assert_eq!(ClosedBand::from_percentage(0.0), ClosedBand::Low);
    }

    #[test]
    fn tiles_format_one_decimal() {
        let m = MetricsRecord {
            total_tickets: 3,
            closed_tickets: 2,
            closed_percentage: 200.0 / 3.0,
            sla_met_percentage: 50.0,
            average_duration_days: 7.5,
            ignored_durations: Vec::new(),
        };
        let tiles = MetricTiles::from(&m);
        assert_eq!(tiles.closed_percentage, "66.7%");
        assert_eq!(tiles.closed_band, ClosedBand::Medium);
        assert_eq!(tiles.sla_met_percentage, "50.0%");
        assert_eq!(tiles.average_duration, "7.5 days");
    }

    #[test]
    fn value_counts_sort_by_frequency_then_first_seen() {
        let counts = value_counts(&sample(), TicketField::OrderType);
        assert_eq!(
            counts,
            vec![
                ("Corretiva".to_string(), 3),
                ("Preventiva".to_string(), 1),
                ("Instalação".to_string(), 1),
            ]
        );
        assert_eq!(top_values(&sample(), TicketField::OrderType, 1).len(), 1);
        assert!(value_counts(&sample(), TicketField::ClientId).is_empty());
    }

    #[test]
    fn monthly_series_is_ascending_and_skips_nulls() {
        assert_eq!(
            monthly_openings(&sample()),
            vec![("2024-01".to_string(), 2), ("2024-02".to_string(), 2)]
        );
    }

    #[test]
    fn region_list_puts_numeric_codes_first() {
        let opts = FilterOptions::progressive(&sample(), &FilterSet::default());
        assert_eq!(opts.regions, vec!["Todos", "12", "35", "BA", "SP"]);
        assert_eq!(opts.statuses, vec!["Todos", "Aberto", "Fechado", "Pendente"]);
        assert_eq!(
            opts.opened_bounds,
            Some((
                NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 28).unwrap()
            ))
        );
    }

    #[test]
    fn lists_narrow_progressively() {
        let filters = FilterSet {
            region: Selection::only("SP"),
            status: Selection::only("Aberto"),
            ..Default::default()
        };
        let opts = FilterOptions::progressive(&sample(), &filters);
        assert_eq!(opts.regions.len(), 5);
        assert_eq!(opts.statuses, vec!["Todos", "Aberto", "Pendente"]);
        assert_eq!(opts.order_types, vec!["Todos", "Corretiva"]);
        let jan10 = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(opts.opened_bounds, Some((jan10, jan10)));
    }
}
