use ticket_insights::config::PipelineOptions;
use ticket_insights::ingestion::{ingest_bytes, IngestionOptions, UploadedFile};
use ticket_insights::processing::{
    compute_metrics, monthly_openings, normalize, top_values, ClosedBand, MetricTiles,
};
use ticket_insights::types::{DataSet, TicketField};

fn table_from_csv(csv: &str) -> DataSet {
    let file = UploadedFile::new("t.csv", csv.as_bytes().to_vec());
    normalize(ingest_bytes(&file, &PipelineOptions::default(), &IngestionOptions::default()).unwrap())
}

fn fixture() -> DataSet {
    let file = UploadedFile::new("tickets.csv", std::fs::read("tests/fixtures/tickets.csv").unwrap());
    normalize(ingest_bytes(&file, &PipelineOptions::default(), &IngestionOptions::default()).unwrap())
}

#[test]
fn closed_count_and_percentage() {
    let ds = table_from_csv("StatusDaOS\nFechado\nAberto\nencerrada \n");
    let m = compute_metrics(&ds, &PipelineOptions::default());

    assert_eq!(m.total_tickets, 3);
    assert_eq!(m.closed_tickets, 2);
    assert!((m.closed_percentage - 200.0 / 3.0).abs() < 1e-9);
    assert_eq!(MetricTiles::from(&m).closed_percentage, "66.7%");
}

#[test]
fn sla_percentage_excludes_unrecognized_tokens() {
    let ds = table_from_csv("SLADeSolucaoAtendido\nSim\nNão\nxyz\n");
    let m = compute_metrics(&ds, &PipelineOptions::default());
    assert_eq!(m.sla_met_percentage, 50.0);
}

#[test]
fn duration_average_skips_out_of_range_rows_but_keeps_them() {
    // Durations: 5, -1, 200, 10 days.
    let ds = table_from_csv(
        "DataPrimeiroAtendimento;DataDeFechamento\n\
         01/01/2024;06/01/2024\n\
         10/01/2024;09/01/2024\n\
         01/01/2024;19/07/2024\n\
         01/02/2024;11/02/2024\n",
    );
    let m = compute_metrics(&ds, &PipelineOptions::default());

    assert_eq!(m.average_duration_days, 7.5);
    assert_eq!(m.ignored_count(), 2);
    let ignored: Vec<(usize, i64)> = m
        .ignored_durations
        .iter()
        .map(|d| (d.row, d.duration_days))
        .collect();
    assert_eq!(ignored, vec![(1, -1), (2, 200)]);
    assert_eq!(ds.row_count(), 4);
}

#[test]
fn fixture_metrics() {
    let ds = fixture();
    let m = compute_metrics(&ds, &PipelineOptions::default());

    assert_eq!(m.total_tickets, 6);
    assert_eq!(m.closed_tickets, 4);
    assert_eq!(m.sla_met_percentage, 75.0);
    assert_eq!(m.average_duration_days, 7.5);
    assert_eq!(m.ignored_count(), 2);
    assert!((0.0..=100.0).contains(&m.closed_percentage));

    let tiles = MetricTiles::from(&m);
    assert_eq!(tiles.closed_band, ClosedBand::Medium);
    assert_eq!(tiles.average_duration, "7.5 days");
}

#[test]
fn metrics_do_not_require_normalization() {
    let file = UploadedFile::new("tickets.csv", std::fs::read("tests/fixtures/tickets.csv").unwrap());
    let raw = ingest_bytes(&file, &PipelineOptions::default(), &IngestionOptions::default()).unwrap();
    assert_eq!(
        compute_metrics(&raw, &PipelineOptions::default()),
        compute_metrics(&fixture(), &PipelineOptions::default())
    );
}

#[test]
fn configured_duration_bound() {
    let opts = PipelineOptions::from_json_str(r#"{ "max_duration_days": 7 }"#).unwrap();
    let m = compute_metrics(&fixture(), &opts);
    assert_eq!(m.average_duration_days, 5.0);
    assert_eq!(m.ignored_count(), 3);
}

#[test]
fn chart_series() {
    let ds = fixture();
    let statuses = top_values(&ds, TicketField::Status, 10);
    assert_eq!(statuses.len(), 6);
    assert!(statuses.iter().all(|(_, n)| *n == 1));

    let types = top_values(&ds, TicketField::OrderType, 10);
    assert_eq!(types[0], ("Corretiva".to_string(), 4));

    assert_eq!(
        monthly_openings(&ds),
        vec![("2024-01".to_string(), 1), ("2024-03".to_string(), 4)]
    );
}
