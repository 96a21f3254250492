//! CSV export, combining exports, and full pipeline runs.

mod common;

use common::{detail, page, query, record, summary, write_dataset, FakeApi, PageResponse};
use listing_trends::config::export_path;
use listing_trends::export::{merge_record, parse_source_timestamp, write_records};
use listing_trends::models::{ListingDetail, COLUMNS};
use listing_trends::{combine_exports, DatePolicy, Pipeline, RecordExporter, TrendsError};
use std::fs;
use std::path::Path;

fn header_line() -> String {
    COLUMNS.join(",")
}

// ---------------------------------------------------------------------------
// RecordExporter
// ---------------------------------------------------------------------------

#[test]
fn empty_input_writes_header_only() {
    let mut buf = Vec::new();
    let rows = RecordExporter::new("Acme").write(&mut buf, &[]).unwrap();

    assert_eq!(rows, 0);
    assert_eq!(String::from_utf8(buf).unwrap(), format!("{}\n", header_line()));
}

#[test]
fn rows_follow_fixed_column_order() {
    let s = summary("a", "25.50", "2024-05-03T10:15:30.000Z");
    let pairs = vec![(s, detail("a"))];

    let mut buf = Vec::new();
    RecordExporter::new("Acme").write(&mut buf, &pairs).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let mut lines = text.lines();

    assert_eq!(lines.next().unwrap(), header_line());
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(lines.next().unwrap().as_bytes());
    let row = rdr.records().next().unwrap().unwrap();
    assert_eq!(row.len(), 16);
    assert_eq!(&row[0], "Item a");
    assert_eq!(&row[1], "Description of a");
    assert_eq!(&row[5], "25.50");
    assert_eq!(&row[6], "AUD");
    assert_eq!(&row[10], "Acme");
    assert_eq!(&row[11], "seller_one");
    assert_eq!(&row[13], "2024-05-03 10:15:30.000");
    assert_eq!(&row[15], "https://img.example.com/a.jpg");
}

#[test]
fn malformed_date_is_empty_cell_when_lenient() {
    let s = summary("a", "1", "yesterday-ish");
    let rec = merge_record(&s, &ListingDetail::default(), "Acme", DatePolicy::Lenient, 1).unwrap();
    assert_eq!(rec.item_creation_date, "");
}

#[test]
fn malformed_date_fails_when_strict() {
    let pairs = vec![
        (summary("a", "1", "2024-05-03T10:15:30.000Z"), detail("a")),
        (summary("b", "1", "not a date"), detail("b")),
    ];
    let err = RecordExporter::new("Acme")
        .date_policy(DatePolicy::Strict)
        .merge_all(&pairs)
        .unwrap_err();
    assert!(matches!(err, TrendsError::DateParse { row: 2, .. }));
}

#[test]
fn source_timestamps_parse_with_and_without_fraction() {
    assert!(parse_source_timestamp("2024-05-03T10:15:30.123Z").is_some());
    assert!(parse_source_timestamp("2024-05-03T10:15:30Z").is_some());
    assert!(parse_source_timestamp("2024-05-03T10:15:30+02:00").is_some());
    assert!(parse_source_timestamp("03/05/2024").is_none());
}

#[test]
fn export_to_path_creates_parent_directories() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("nested").join("Acme.csv");
    let pairs = vec![(summary("a", "1", ""), detail("a"))];

    let rows = RecordExporter::new("Acme").export_to_path(&path, &pairs).unwrap();
    assert_eq!(rows, 1);
    assert!(path.exists());
}

#[test]
fn export_path_is_named_after_brand() {
    assert_eq!(export_path(Path::new("data"), "Acme"), Path::new("data/Acme.csv"));
    assert_eq!(export_path(Path::new("data"), "A/B"), Path::new("data/A_B.csv"));
}

// ---------------------------------------------------------------------------
// combine_exports
// ---------------------------------------------------------------------------

#[test]
fn combine_concatenates_in_file_name_order() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("data");
    fs::create_dir_all(&input).unwrap();
    write_dataset(&input, "b.csv", &[record("B", "2", "2024-05-01 00:00:00.000")]);
    write_dataset(
        &input,
        "a.csv",
        &[
            record("A", "1", "2024-05-01 00:00:00.000"),
            record("A", "3", "2024-05-02 00:00:00.000"),
        ],
    );
    fs::write(input.join("notes.txt"), "ignored").unwrap();

    let output = tmp.path().join("app_data").join("data.csv");
    let report = combine_exports(&input, &output).unwrap();

    assert_eq!(report.files.len(), 2);
    assert_eq!(report.rows, 3);
    let mut rdr = csv::Reader::from_path(&output).unwrap();
    let brands: Vec<String> = rdr.records().map(|r| r.unwrap()[10].to_string()).collect();
    assert_eq!(brands, vec!["A", "A", "B"]);
}

#[test]
fn combine_rejects_foreign_header() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("bad.csv"), "Name,Price\nx,1\n").unwrap();

    let err = combine_exports(tmp.path(), &tmp.path().join("out").join("all.csv")).unwrap_err();
    assert!(matches!(err, TrendsError::Schema(_)));
}

#[test]
fn combine_empty_directory_writes_header() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tmp.path().join("all.csv");
    let report = combine_exports(tmp.path(), &output).unwrap();

    assert_eq!(report.rows, 0);
    assert_eq!(fs::read_to_string(&output).unwrap().trim_end(), header_line());
}

#[test]
fn write_records_round_trips_through_csv_reader() {
    let mut buf = Vec::new();
    let mut rec = record("Acme", "12.5", "2024-05-01 00:00:00.000");
    rec.short_description = "line one\nline two, with comma".to_string();
    write_records(&mut buf, &[rec.clone()]).unwrap();

    let mut rdr = csv::Reader::from_reader(buf.as_slice());
    let back: listing_trends::models::MergedRecord =
        rdr.deserialize().next().unwrap().unwrap();
    assert_eq!(back, rec);
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[test]
fn pipeline_writes_brand_file() {
    let items = vec![
        summary("a", "10", "2024-05-03T10:00:00.000Z"),
        summary("b", "20", "2024-04-03T10:00:00.000Z"),
    ];
    let api = FakeApi::new(vec![page(items.clone(), 2)])
        .with_detail(&items[0].item_href, detail("a"));
    let tmp = tempfile::tempdir().unwrap();

    let mut events = Vec::new();
    let report = Pipeline::with_api(api)
        .run_with(&query("Acme", 200), tmp.path(), DatePolicy::Lenient, |p| {
            events.push(p)
        })
        .unwrap();

    assert_eq!(report.listed, 2);
    assert_eq!(report.rows, 2);
    assert!(report.halted.is_none());
    let path = report.exported.unwrap();
    assert_eq!(path, tmp.path().join("Acme.csv"));
    assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 3);
    assert_eq!(events.len(), 3);
}

#[test]
fn pipeline_skips_export_when_nothing_found() {
    let api = FakeApi::new(vec![page(vec![], 0)]);
    let tmp = tempfile::tempdir().unwrap();

    let report = Pipeline::with_api(api)
        .run(&query("Nobody", 200), tmp.path(), DatePolicy::Lenient)
        .unwrap();

    assert!(report.exported.is_none());
    assert!(!tmp.path().join("Nobody.csv").exists());
}

#[test]
fn pipeline_fails_on_expired_token() {
    let api = FakeApi::new(vec![page(vec![summary("a", "1", "")], 5), PageResponse::Status(401)]);
    let tmp = tempfile::tempdir().unwrap();

    let err = Pipeline::with_api(api)
        .run(&query("Acme", 1), tmp.path(), DatePolicy::Lenient)
        .unwrap_err();
    assert!(err.is_token_expired());
    assert!(!tmp.path().join("Acme.csv").exists());
}

#[test]
fn pipeline_fails_when_token_expires_during_details() {
    let items = vec![summary("a", "1", ""), summary("b", "2", "")];
    let api = FakeApi::new(vec![page(items.clone(), 2)])
        .with_detail(&items[0].item_href, detail("a"))
        .with_detail_status(&items[1].item_href, 401);
    let tmp = tempfile::tempdir().unwrap();

    let err = Pipeline::with_api(api)
        .run(&query("Acme", 200), tmp.path(), DatePolicy::Lenient)
        .unwrap_err();
    assert!(err.is_token_expired());
    assert!(!tmp.path().join("Acme.csv").exists());
}

#[test]
fn pipeline_exports_partial_results_after_other_errors() {
    let api = FakeApi::new(vec![page(vec![summary("a", "1", "")], 5), PageResponse::Status(500)]);
    let tmp = tempfile::tempdir().unwrap();

    let report = Pipeline::with_api(api)
        .run(&query("Acme", 1), tmp.path(), DatePolicy::Lenient)
        .unwrap();
    assert_eq!(report.rows, 1);
    assert!(matches!(report.halted, Some(TrendsError::Fetch { status: 500, .. })));
}
