//! Column normalization.

use crate::dates::value_as_datetime;
use crate::types::{DataSet, DataType, TicketField, Value, NOT_INFORMED};

/// Normalize a freshly ingested table.
///
/// - `OpenedAt` and `ClosedAt` are re-read as dates (day-first); unparseable values become
///   [`Value::Null`], never an error.
/// - Every column that is not a date column has its [`Value::Null`] cells replaced by
///   [`NOT_INFORMED`]. Date columns keep true absence.
/// - Present text values are never rewritten.
///
/// Running it twice yields the same table.
pub fn normalize(mut table: DataSet) -> DataSet {
    for field in TicketField::NORMALIZED_DATES {
        if let Some(idx) = table.column(field) {
            table.schema.fields[idx].data_type = DataType::DateTime;
            for row in &mut table.rows {
                if let Some(cell) = row.get_mut(idx) {
                    *cell = value_as_datetime(cell).map_or(Value::Null, Value::DateTime);
                }
            }
        }
    }

    let text_columns: Vec<usize> = table
        .schema
        .fields
        .iter()
        .enumerate()
        .filter(|(_, f)| f.data_type != DataType::DateTime)
        .map(|(idx, _)| idx)
        .collect();

    for row in &mut table.rows {
        for &idx in &text_columns {
            if let Some(cell) = row.get_mut(idx).filter(|c| c.is_null()) {
                *cell = Value::text(NOT_INFORMED);
            }
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Field, Schema};
    use chrono::NaiveDate;

    fn raw() -> DataSet {
        DataSet::new(
            Schema::from_headers(["OrdemDeServico", "DataDeAbertura", "DataDeFechamento", "NumeroSerie"]),
            vec![
                vec![
                    Value::text("0042"),
                    Value::text("05/01/2024"),
                    Value::text("bogus"),
                    Value::Null,
                ],
                vec![Value::Null, Value::Null, Value::text("2024-02-01"), Value::text("SN1")],
            ],
        )
    }

    #[test]
    fn parses_the_two_date_columns_and_fills_the_rest() {
        let ds = normalize(raw());
        let jan5 = NaiveDate::from_ymd_opt(2024, 1, 5)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();

        assert_eq!(ds.schema.fields[1].data_type, DataType::DateTime);
        assert_eq!(ds.schema.fields[2].data_type, DataType::DateTime);
        assert_eq!(ds.rows[0][0], Value::text("0042"));
        assert_eq!(ds.rows[0][1], Value::DateTime(jan5));
        assert_eq!(ds.rows[0][2], Value::Null);
        assert_eq!(ds.rows[0][3], Value::text(NOT_INFORMED));
        assert_eq!(ds.rows[1][0], Value::text(NOT_INFORMED));
        assert_eq!(ds.rows[1][1], Value::Null);
    }

    #[test]
    fn is_idempotent() {
        let once = normalize(raw());
        let twice = normalize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn keeps_nulls_in_columns_already_typed_as_dates() {
        let ds = DataSet::new(
            Schema::new(vec![Field::new("DataPrimeiroAtendimento", DataType::DateTime)]),
            vec![vec![Value::Null]],
        );
        assert_eq!(normalize(ds).rows[0][0], Value::Null);
    }

    #[test]
    fn first_response_text_is_left_alone() {
        let ds = DataSet::new(
            Schema::from_headers(["DataPrimeiroAtendimento"]),
            vec![vec![Value::text("05/01/2024")], vec![Value::Null]],
        );
        let out = normalize(ds);
        assert_eq!(out.rows[0][0], Value::text("05/01/2024"));
        assert_eq!(out.rows[1][0], Value::text(NOT_INFORMED));
    }
}
