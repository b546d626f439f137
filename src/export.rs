//! Column projection and export serialization.
//!
//! [`project`] selects the configured export columns, in order, failing with every missing
//! column name when the table lacks any of them. [`export`] projects and then serializes the
//! result to semicolon-delimited text and (with the `excel` feature) an `.xlsx` workbook, both
//! generated fresh on every call.

use chrono::{Local, NaiveDateTime};

use crate::config::PipelineOptions;
use crate::error::{ExportError, ExportResult};
use crate::types::{DataSet, Schema, Value};

pub const CSV_MIME: &str = "text/csv";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// One generated download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Both downloads for one export click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBundle {
    pub csv: ExportFile,
    #[cfg(feature = "excel")]
    pub xlsx: ExportFile,
}

/// Names in `required` that `table` does not have, in `required` order.
pub fn missing_columns(table: &DataSet, required: &[String]) -> Vec<String> {
    required
        .iter()
        .filter(|name| table.schema.index_of(name).is_none())
        .cloned()
        .collect()
}

/// Project `table` onto exactly `required`, in that order, keeping every row in order.
pub fn project(table: &DataSet, required: &[String]) -> ExportResult<DataSet> {
    let missing = missing_columns(table, required);
    if !missing.is_empty() {
        return Err(ExportError::MissingColumns { missing });
    }

    let idxs: Vec<usize> = required
        .iter()
        .filter_map(|name| table.schema.index_of(name))
        .collect();
    let schema = Schema::new(idxs.iter().map(|&i| table.schema.fields[i].clone()).collect());
    let rows = table
        .rows
        .iter()
        .map(|row| {
            idxs.iter()
                .map(|&i| row.get(i).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    Ok(DataSet::new(schema, rows))
}

/// Serialize `table` as delimited text with a header row. Missing cells are empty; dates use
/// [`crate::types::DATETIME_TEXT_FORMAT`].
pub fn to_csv_bytes(table: &DataSet, delimiter: u8) -> ExportResult<Vec<u8>> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    wtr.write_record(table.schema.field_names())?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(Value::to_text))?;
    }

    wtr.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

/// Serialize `table` as a single-sheet `.xlsx` workbook. Text cells are written as strings,
/// dates as date cells, missing cells are left blank.
#[cfg(feature = "excel")]
pub fn to_xlsx_bytes(table: &DataSet) -> ExportResult<Vec<u8>> {
    use rust_xlsxwriter::{Format, Workbook, XlsxError};

    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in table.schema.field_names().enumerate() {
        let col = u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)?;
        worksheet.write_string_with_format(0, col, name, &header_format)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let r = u32::try_from(row_idx + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        for (col, value) in row.iter().enumerate() {
            let c = u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)?;
            match value {
                Value::Null => {}
                Value::Utf8(s) => {
                    worksheet.write_string(r, c, s)?;
                }
                Value::DateTime(dt) => {
                    worksheet.write_datetime_with_format(r, c, dt, &date_format)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// `<stem>_<YYYYmmdd_HHMMSS>.<ext>`
pub fn export_file_name(stem: &str, extension: &str, at: NaiveDateTime) -> String {
    format!("{stem}_{}.{extension}", at.format("%Y%m%d_%H%M%S"))
}

/// Project `table` onto the configured export columns and serialize both downloads.
pub fn export(table: &DataSet, options: &PipelineOptions) -> ExportResult<ExportBundle> {
    let projected = project(table, &options.export_columns)?;
    let now = Local::now().naive_local();

    Ok(ExportBundle {
        csv: ExportFile {
            file_name: export_file_name(&options.export_file_stem, "csv", now),
            mime: CSV_MIME,
            bytes: to_csv_bytes(&projected, options.delimiter_byte())?,
        },
        #[cfg(feature = "excel")]
        xlsx: ExportFile {
            file_name: export_file_name(&options.export_file_stem, "xlsx", now),
            mime: XLSX_MIME,
            bytes: to_xlsx_bytes(&projected)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn table() -> DataSet {
        DataSet::new(
            Schema::from_headers(["B", "A", "C"]),
            vec![
                vec![Value::text("b1"), Value::text("a1"), Value::text("c1")],
                vec![Value::text("b2"), Value::Null, Value::text("c;2")],
            ],
        )
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn projects_in_required_order() {
        let out = project(&table(), &cols(&["A", "C"])).unwrap();
        assert_eq!(out.schema.field_names().collect::<Vec<_>>(), vec!["A", "C"]);
        assert_eq!(out.rows[0], vec![Value::text("a1"), Value::text("c1")]);
        assert_eq!(out.row_count(), 2);
    }

    #[test]
    fn reports_every_missing_column() {
        let err = project(&table(), &cols(&["X", "A", "Y"])).unwrap_err();
        match err {
            ExportError::MissingColumns { missing } => assert_eq!(missing, cols(&["X", "Y"])),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn csv_quotes_delimiters_and_blanks_nulls() {
        let bytes = to_csv_bytes(&table(), b';').unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "B;A;C\nb1;a1;c1\nb2;;\"c;2\"\n");
    }

    #[test]
    fn file_names_carry_the_timestamp() {
        let at = NaiveDate::from_ymd_opt(2024, 7, 1)
            .and_then(|d| d.and_hms_opt(9, 8, 7))
            .unwrap();
        assert_eq!(
            export_file_name("atendimento_filtrado", "csv", at),
            "atendimento_filtrado_20240701_090807.csv"
        );
    }
}
