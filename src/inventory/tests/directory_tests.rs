//! Metadata directory source tests

use super::metadata_table;
use crate::catalog::Catalog;
use crate::error::CalibError;
use crate::inventory::{InventorySource, IpacTable, MetadataDirectory, records_from_table};
use crate::matcher::StarMatcher;
use crate::models::{CalibrationKind, ImageType, ObservationRecord};
use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn night() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 5, 20).unwrap()
}

fn sample_records() -> Vec<ObservationRecord> {
    vec![
        ObservationRecord::new("KB.20200520.05000.00.fits", "bias"),
        ObservationRecord::new("KB.20200520.05100.00.fits", "bias"),
        ObservationRecord::new("KB.20200520.06000.00.fits", "flatlamp").at(10.0, 19.8),
        ObservationRecord::new("KB.20200520.18123.45.fits", "object").at(159.902958, 43.102806),
    ]
}

#[test]
fn test_records_from_table_keeps_native_order() {
    let contents = metadata_table(&sample_records());
    let table = IpacTable::parse(&contents, Path::new("night.tbl")).unwrap();
    let records = records_from_table(&table, Path::new("night.tbl")).unwrap();

    assert_eq!(records, sample_records());
    assert_eq!(
        records[2].image_type(),
        ImageType::Calibration(CalibrationKind::LampFlat)
    );
    assert_eq!(records[0].coord, None);
}

#[test]
fn test_records_from_table_requires_columns() {
    let contents = "|koaid|koaimtyp|ra|\n KB.1  bias     1.0\n";
    let table = IpacTable::parse(contents, Path::new("short.tbl")).unwrap();
    let result = records_from_table(&table, Path::new("short.tbl"));
    assert!(matches!(result, Err(CalibError::MetadataFormat { .. })));
}

#[test]
fn test_rows_without_id_are_skipped() {
    let contents = "|koaid |koaimtyp|ra   |dec  |\n null   bias     null  null\n KB.2   dark     null  null\n";
    let table = IpacTable::parse(contents, Path::new("ids.tbl")).unwrap();
    let records = records_from_table(&table, Path::new("ids.tbl")).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "KB.2");
}

#[test]
fn test_non_finite_pointings_do_not_hide_star() {
    let mut contents = metadata_table(&[
        ObservationRecord::new("KB.20200520.18123.45.fits", "object").at(159.902958, 43.102806),
    ]);
    contents.push_str(&format!(
        " {:<30} {:<10} {:<12} {:<12} {:<10}\n",
        "KB.20200520.18200.00.fits", "object", "nan", "nan", "null"
    ));
    contents.push_str(&format!(
        " {:<30} {:<10} {:<12} {:<12} {:<10}\n",
        "KB.20200520.18300.00.fits", "object", "inf", "-inf", "null"
    ));

    let table = IpacTable::parse(&contents, Path::new("nan.tbl")).unwrap();
    let records = records_from_table(&table, Path::new("nan.tbl")).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[1].coord, None);
    assert_eq!(records[2].coord, None);

    let matcher = StarMatcher::new(Catalog::builtin().unwrap(), 5.0);
    let hit = matcher.find(&records).unwrap();
    assert_eq!(hit.star_name, "feige34");
    assert_eq!(hit.record_id, "KB.20200520.18123.45.fits");
}

#[tokio::test]
async fn test_fetch_reads_night_table() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("koa_metadata_2020-05-20.tbl"),
        metadata_table(&sample_records()),
    )
    .unwrap();

    let source = MetadataDirectory::new(temp_dir.path());
    let records = source.fetch(night()).await.unwrap();

    assert_eq!(records.len(), 4);
    assert_eq!(records[3].id, "KB.20200520.18123.45.fits");
    assert!(source.describe().contains("kcwi"));
}

#[tokio::test]
async fn test_fetch_missing_night_is_unavailable() {
    let temp_dir = TempDir::new().unwrap();
    let source = MetadataDirectory::new(temp_dir.path());

    let result = source.fetch(night()).await;
    assert!(matches!(
        result,
        Err(CalibError::InventoryUnavailable { date, .. }) if date == night()
    ));
}

#[tokio::test]
async fn test_fetch_malformed_table() {
    let temp_dir = TempDir::new().unwrap();
    let source = MetadataDirectory::new(temp_dir.path());
    fs::write(source.table_path(night()), "not an ipac table\n").unwrap();

    let result = source.fetch(night()).await;
    assert!(matches!(result, Err(CalibError::MetadataFormat { .. })));
}
