//! Delimited-text ingestion with encoding fallback.

use std::collections::HashSet;
use std::io;

use crate::config::PipelineOptions;
use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, Schema, Value};

use super::encoding::TextEncoding;

/// Ingest delimited text from raw bytes, trying each configured encoding in order.
///
/// The first encoding that both decodes the bytes and yields a well-formed table wins; the
/// remaining candidates are not tried. Returns the table and the encoding that produced it.
///
/// Rules:
///
/// - The first record is the header row; duplicate names get `.1`, `.2`, ... suffixes.
/// - Cell text is kept verbatim; cells equal to a configured missing marker become
///   [`Value::Null`].
/// - Rows shorter than the header are padded with nulls; longer rows are an error.
pub fn ingest_csv_from_bytes(
    bytes: &[u8],
    options: &PipelineOptions,
) -> IngestionResult<(DataSet, TextEncoding)> {
    let mut last_error = "no candidate encodings configured".to_string();

    for &encoding in &options.encodings {
        let Some(text) = encoding.decode(bytes) else {
            last_error = format!("{encoding}: invalid byte sequence");
            continue;
        };

        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(options.delimiter_byte())
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        match ingest_csv_from_reader(&mut rdr, options) {
            Ok(ds) => return Ok((ds, encoding)),
            Err(e) => last_error = format!("{encoding}: {e}"),
        }
    }

    let tried = options
        .encodings
        .iter()
        .map(|e| e.label())
        .collect::<Vec<_>>()
        .join(", ");
    Err(IngestionError::Decode { tried, last_error })
}

/// Ingest CSV data from an existing CSV reader (already decoded to UTF-8).
///
/// The reader should be `flexible` so short rows reach the padding logic.
pub fn ingest_csv_from_reader<R: io::Read>(
    rdr: &mut csv::Reader<R>,
    options: &PipelineOptions,
) -> Result<DataSet, csv::Error> {
    let headers = dedupe_headers(rdr.headers()?.iter());
    let width = headers.len();

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // 1-based for users, +1 for the header row.
        let user_row = row_idx0 + 2;
        let record = result?;

        if record.len() > width {
            return Err(csv::Error::from(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "row {user_row}: expected {width} fields, saw {}",
                    record.len()
                ),
            )));
        }
        if width > 1 && record.len() == 1 && record.get(0) == Some("") {
            continue;
        }

        let mut row: Vec<Value> = Vec::with_capacity(width);
        for idx in 0..width {
            let raw = record.get(idx);
            row.push(match raw {
                Some(raw) if !options.is_missing_marker(raw) => Value::Utf8(raw.to_owned()),
                _ => Value::Null,
            });
        }
        rows.push(row);
    }

    Ok(DataSet::new(Schema::from_headers(headers), rows))
}

/// Make header names unique by suffixing repeats with `.1`, `.2`, ...
pub(crate) fn dedupe_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for h in headers {
        let mut name = h.to_string();
        let mut n = 0usize;
        while seen.contains(&name) {
            n += 1;
            name = format!("{h}.{n}");
        }
        seen.insert(name.clone());
        out.push(name);
    }
    out
}
