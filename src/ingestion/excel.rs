#![cfg(feature = "excel")]

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::{Duration, NaiveDateTime, Timelike};

use crate::config::PipelineOptions;
use crate::dates::parse_day_first;
use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::csv::dedupe_headers;

/// Ingest the first sheet of a workbook (`.xlsx`, `.xls`, `.ods`, ...) held in memory.
///
/// Behavior:
/// - Detects the first non-empty row as the header row
/// - Numeric cells become text (integral floats without a fraction)
/// - Date cells become [`Value::DateTime`], rounded to the second; a column whose non-empty
///   cells are all dates is typed [`DataType::DateTime`]
/// - Empty cells, and text cells equal to a configured missing marker, become [`Value::Null`]
pub fn ingest_excel_from_bytes(bytes: &[u8], options: &PipelineOptions) -> IngestionResult<DataSet> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestionError::Spreadsheet {
            message: "workbook has no sheets".to_string(),
        })?;
    let range = workbook.worksheet_range(&first)?;

    ingest_sheet_range(&first, &range, options)
}

fn ingest_sheet_range(
    sheet: &str,
    range: &Range<Data>,
    options: &PipelineOptions,
) -> IngestionResult<DataSet> {
    let Some((header_row_idx, header_cells)) = find_header_row(range) else {
        return Err(IngestionError::Spreadsheet {
            message: format!("sheet '{sheet}' has no non-empty rows (no header row found)"),
        });
    };
    let width = header_cells.len();
    let headers = dedupe_headers(header_cells.iter().map(String::as_str));

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for row in range.rows().skip(header_row_idx + 1) {
        let out_row: Vec<Value> = (0..width)
            .map(|idx| convert_cell(row.get(idx).unwrap_or(&Data::Empty), options))
            .collect();
        rows.push(out_row);
    }

    let fields = headers
        .into_iter()
        .enumerate()
        .map(|(idx, name)| Field::new(name, infer_column_type(&rows, idx)))
        .collect();

    Ok(DataSet::new(Schema::new(fields), rows))
}

fn find_header_row(range: &Range<Data>) -> Option<(usize, Vec<String>)> {
    range.rows().enumerate().find_map(|(idx0, row)| {
        let non_empty = row.iter().any(|c| !matches!(c, Data::Empty));
        non_empty.then(|| (idx0, row.iter().map(cell_to_string).collect()))
    })
}

fn infer_column_type(rows: &[Vec<Value>], idx: usize) -> DataType {
    let mut saw_date = false;
    for row in rows {
        match row.get(idx) {
            Some(Value::DateTime(_)) => saw_date = true,
            Some(Value::Null) | None => {}
            Some(Value::Utf8(_)) => return DataType::Utf8,
        }
    }
    if saw_date {
        DataType::DateTime
    } else {
        DataType::Utf8
    }
}

fn convert_cell(c: &Data, options: &PipelineOptions) -> Value {
    match c {
        Data::Empty => Value::Null,
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(parsed) if dt.is_datetime() => Value::DateTime(round_to_second(parsed)),
            _ => Value::Utf8(dt.to_string()),
        },
        Data::DateTimeIso(s) => match parse_day_first(s) {
            Some(parsed) => Value::DateTime(parsed),
            None => Value::Utf8(s.clone()),
        },
        Data::String(s) if options.is_missing_marker(s) => Value::Null,
        other => Value::Utf8(cell_to_string(other)),
    }
}

fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(f) => f.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => String::new(),
    }
}

/// Serial dates carry float noise (`23:59:59.9996`); snap to the nearest second.
fn round_to_second(dt: NaiveDateTime) -> NaiveDateTime {
    let truncated = dt.with_nanosecond(0).unwrap_or(dt);
    if dt.nanosecond() >= 500_000_000 {
        truncated + Duration::seconds(1)
    } else {
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn rounds_float_noise_to_the_nearest_second() {
        let noisy = NaiveDate::from_ymd_opt(2024, 1, 4)
            .and_then(|d| d.and_hms_nano_opt(23, 59, 59, 999_600_000))
            .unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        assert_eq!(round_to_second(noisy), expected);
    }

    #[test]
    fn integral_floats_render_without_fraction() {
        assert_eq!(cell_to_string(&Data::Float(12.0)), "12");
        assert_eq!(cell_to_string(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_to_string(&Data::Int(7)), "7");
    }

    #[test]
    fn column_type_is_date_only_when_every_value_is_a_date() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 5)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        let rows = vec![
            vec![Value::DateTime(dt), Value::DateTime(dt)],
            vec![Value::Null, Value::text("x")],
        ];
        assert_eq!(infer_column_type(&rows, 0), DataType::DateTime);
        assert_eq!(infer_column_type(&rows, 1), DataType::Utf8);
        assert_eq!(infer_column_type(&[vec![Value::Null]], 0), DataType::Utf8);
    }

    #[test]
    fn garbage_bytes_are_a_reader_error() {
        let err = ingest_excel_from_bytes(b"not a workbook", &PipelineOptions::default()).unwrap_err();
        assert!(matches!(err, IngestionError::Excel(_)));
    }
}
