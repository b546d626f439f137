use ticket_insights::config::PipelineOptions;
use ticket_insights::error::FailureKind;
use ticket_insights::ingestion::csv::ingest_csv_from_bytes;
use ticket_insights::ingestion::{ingest_bytes, load, IngestionOptions, TextEncoding, UploadedFile};
use ticket_insights::processing::normalize;
use ticket_insights::types::{DataType, TicketField, Value};
use ticket_insights::{IngestionError, NOT_INFORMED};

fn fixture_bytes() -> Vec<u8> {
    std::fs::read("tests/fixtures/tickets.csv").unwrap()
}

fn to_latin1(text: &str) -> Vec<u8> {
    text.chars().map(|c| u8::try_from(c).unwrap()).collect()
}

#[test]
fn ingest_fixture_happy_path() {
    let file = UploadedFile::new("tickets.csv", fixture_bytes());
    let ds = ingest_bytes(&file, &PipelineOptions::default(), &IngestionOptions::default()).unwrap();

    assert_eq!(ds.row_count(), 6);
    assert_eq!(ds.schema.len(), 14);
    assert_eq!(ds.schema.index_of("Tecnico"), Some(13));

    let status = ds.column(TicketField::Status).unwrap();
    assert_eq!(ds.rows[2][status], Value::text("encerrada "));

    let serial = ds.column(TicketField::SerialNumber).unwrap();
    assert_eq!(ds.rows[1][serial], Value::Null);
}

#[test]
fn latin1_file_decodes_with_the_fallback_encoding() {
    let text = String::from_utf8(fixture_bytes()).unwrap();
    let (ds, encoding) = ingest_csv_from_bytes(&to_latin1(&text), &PipelineOptions::default()).unwrap();

    assert_eq!(encoding, TextEncoding::Latin1);
    let town = ds.column(TicketField::Municipality).unwrap();
    assert_eq!(ds.rows[0][town], Value::text("São Paulo"));
    assert_eq!(ds.rows[3][town], Value::text("Niterói"));
}

#[test]
fn normalized_fixture_has_dates_and_sentinels() {
    let file = UploadedFile::new("tickets.csv", fixture_bytes());
    let ds = normalize(ingest_bytes(&file, &PipelineOptions::default(), &IngestionOptions::default()).unwrap());

    let opened = ds.column(TicketField::OpenedAt).unwrap();
    let closed = ds.column(TicketField::ClosedAt).unwrap();
    let first = ds.column(TicketField::FirstResponseAt).unwrap();
    let remark = ds.column(TicketField::ClientRemark).unwrap();

    assert_eq!(ds.schema.fields[opened].data_type, DataType::DateTime);
    assert_eq!(ds.schema.fields[first].data_type, DataType::Utf8);
    assert!(matches!(ds.rows[0][opened], Value::DateTime(_)));
    assert_eq!(ds.rows[4][opened], Value::Null);
    assert_eq!(ds.rows[1][closed], Value::Null);
    assert_eq!(ds.rows[1][remark], Value::text(NOT_INFORMED));
    assert_eq!(ds.rows[0][first], Value::text("01/03/2024 09:00"));

    let order = ds.column(TicketField::OrderId).unwrap();
    assert_eq!(ds.rows[0][order], Value::text("1001"));
}

#[test]
fn ragged_file_is_a_decode_failure() {
    let file = UploadedFile::new("broken.csv", "a;b\n1;2;3\n".as_bytes().to_vec());
    let out = load(Some(&file), &PipelineOptions::default(), &IngestionOptions::default());

    assert!(out.table.is_empty());
    let diag = out.diagnostic.unwrap();
    assert_eq!(diag.kind, FailureKind::DecodeFailure);
    assert!(diag.message.contains("could not decode"));
}

#[test]
fn unsupported_extension_is_reported() {
    let file = UploadedFile::new("tickets.json", b"[]".to_vec());
    let err = ingest_bytes(&file, &PipelineOptions::default(), &IngestionOptions::default()).unwrap_err();
    assert!(matches!(err, IngestionError::UnsupportedFormat { ref extension } if extension == "json"));
    assert_eq!(err.kind(), FailureKind::UnsupportedFormat);
}

#[test]
fn custom_delimiter_from_options() {
    let opts = PipelineOptions::from_json_str(r#"{ "delimiter": "," }"#).unwrap();
    let file = UploadedFile::new("t.csv", "Uf,StatusDaOS\nSP,Aberto\n".as_bytes().to_vec());
    let ds = ingest_bytes(&file, &opts, &IngestionOptions::default()).unwrap();
    assert_eq!(ds.rows[0], vec![Value::text("SP"), Value::text("Aberto")]);
}
