//! Row filtering for ticket tables.
//!
//! A [`FilterSet`] holds one predicate per dimension. Region, status and type are either a no-op
//! ("All") or an equality test against one column; the opened date is a range that always drops
//! rows without a date. They compose by conjunction, applied region → status → type → opened
//! date, each narrowing the output of the previous one. A filter whose column is absent from the
//! table is skipped.

use chrono::NaiveDate;

use crate::dates::value_as_datetime;
use crate::types::{DataSet, TicketField, Value};

/// Label of the no-op entry in selector lists.
pub const ALL_LABEL: &str = "Todos";

/// Single-select over a text column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// No filtering on this dimension.
    #[default]
    All,
    /// Keep rows whose value equals this text.
    Only(String),
}

impl Selection {
    pub fn only(value: impl Into<String>) -> Self {
        Self::Only(value.into())
    }

    /// Build from a selector label, mapping [`ALL_LABEL`] to [`Selection::All`].
    pub fn from_label(label: &str) -> Self {
        if label == ALL_LABEL {
            Self::All
        } else {
            Self::Only(label.to_string())
        }
    }
}

/// Filter on the date component of `OpenedAt`.
///
/// The dashboard's date control is always a range; its default is [`DateFilter::OPEN`], which
/// still drops rows without an opened date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    /// No date filtering at all; rows without an opened date are kept.
    All,
    /// Drop rows without an opened date, then keep `from <= date <= to`. A `None` bound means
    /// the data's own minimum/maximum, i.e. no narrowing on that side.
    Between {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl Default for DateFilter {
    fn default() -> Self {
        Self::OPEN
    }
}

impl DateFilter {
    /// Range bounded by the data itself.
    pub const OPEN: Self = Self::Between { from: None, to: None };

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self::Between {
            from: Some(from),
            to: Some(to),
        }
    }

    fn admits(&self, date: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Between { from, to } => {
                from.is_none_or(|f| f <= date) && to.is_none_or(|t| date <= t)
            }
        }
    }
}

/// The user's current filter choices.
///
/// The default selects "All" on every single-select dimension and the open date range.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSet {
    pub region: Selection,
    pub status: Selection,
    pub order_type: Selection,
    pub opened: DateFilter,
}

impl FilterSet {
    /// Every dimension set to pass rows through unchanged, including rows without an opened
    /// date.
    pub fn pass_through() -> Self {
        Self {
            opened: DateFilter::All,
            ..Self::default()
        }
    }

    /// `true` when no dimension can drop a row.
    pub fn is_noop(&self) -> bool {
        *self == Self::pass_through()
    }
}

/// Apply `filters` to `table`, returning a new view. The input is never modified.
pub fn apply_filters(table: &DataSet, filters: &FilterSet) -> DataSet {
    let view = filter_selection(table, TicketField::State, &filters.region);
    let view = filter_selection(&view, TicketField::Status, &filters.status);
    let view = filter_selection(&view, TicketField::OrderType, &filters.order_type);
    filter_opened(&view, &filters.opened)
}

/// Apply one single-select filter.
pub fn filter_selection(table: &DataSet, field: TicketField, selection: &Selection) -> DataSet {
    let Selection::Only(wanted) = selection else {
        return table.clone();
    };
    let Some(idx) = table.column(field) else {
        return table.clone();
    };
    // Region codes arrive padded from some exports; the selector lists them trimmed.
    let trim = field == TicketField::State;

    table.filter_rows(|row| match row.get(idx).and_then(Value::as_text) {
        Some(text) if trim => text.trim() == wanted.trim(),
        Some(text) => text == wanted.as_str(),
        None => false,
    })
}

/// Apply the opened-date filter.
pub fn filter_opened(table: &DataSet, filter: &DateFilter) -> DataSet {
    if matches!(filter, DateFilter::All) {
        return table.clone();
    }
    let Some(idx) = table.column(TicketField::OpenedAt) else {
        return table.clone();
    };

    table.filter_rows(|row| {
        row.get(idx)
            .and_then(value_as_datetime)
            .is_some_and(|dt| filter.admits(dt.date()))
    })
}
