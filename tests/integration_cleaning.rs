//! Integration tests for the cleaning pipeline
//!
//! These tests exercise the full clean path end to end: a raw CSV file on
//! disk is read, validated through every stage, and persisted as the three
//! run artifacts.

use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

use trip_warehouse::app::services::cleaning::{CleaningLog, TripCleaner, write_artifacts};
use trip_warehouse::app::services::trip_reader;
use trip_warehouse::config::QualityRulesConfig;

const RAW_HEADER: &str = "id,vendor_id,pickup_datetime,dropoff_datetime,passenger_count,\
                          pickup_longitude,pickup_latitude,dropoff_longitude,dropoff_latitude,\
                          store_and_fwd_flag,trip_duration";

/// A raw file mixing valid trips with one defect per validation stage
fn write_mixed_raw_file(dir: &TempDir) -> PathBuf {
    let rows = [
        // Valid downtown-to-midtown trips
        "id001,2,2016-03-14 17:24:55,2016-03-14 17:34:55,1,-74.0059,40.7128,-73.9851,40.7589,N,600",
        "id002,1,2016-03-15 08:30:00,2016-03-15 08:45:00,2,-73.9866,40.7306,-73.9851,40.7589,N,900",
        // Missing passenger count
        "id003,2,2016-03-14 12:00:00,2016-03-14 12:10:00,,-74.0059,40.7128,-73.9851,40.7589,N,600",
        // Duplicate of id001 with a different payload
        "id001,1,2016-03-14 18:00:00,2016-03-14 18:10:00,3,-74.0059,40.7128,-73.9851,40.7589,Y,600",
        // Dropoff before pickup
        "id004,2,2016-03-14 15:00:00,2016-03-14 14:00:00,1,-74.0059,40.7128,-73.9851,40.7589,N,600",
        // Zero pickup latitude
        "id005,2,2016-03-14 10:00:00,2016-03-14 10:10:00,1,-74.0059,0.0,-73.9851,40.7589,N,600",
        // Seven passengers
        "id006,2,2016-03-14 11:00:00,2016-03-14 11:10:00,7,-74.0059,40.7128,-73.9851,40.7589,N,600",
        // Thirty-second trip
        "id007,2,2016-03-14 09:00:00,2016-03-14 09:00:30,1,-74.0059,40.7128,-73.9851,40.7589,N,30",
    ];

    let path = dir.path().join("trips.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "{}", RAW_HEADER).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    path
}

#[test]
fn test_clean_mixed_file_end_to_end() {
    let dir = TempDir::new().unwrap();
    let input = write_mixed_raw_file(&dir);

    let records = trip_reader::read_raw_trips(&input).unwrap();
    assert_eq!(records.len(), 8);

    let cleaner = TripCleaner::new(QualityRulesConfig::default());
    let result = cleaner.clean(records, false);

    // Only the two valid trips survive, and every drop is accounted for
    assert_eq!(result.record_count(), 2);
    assert!(result.is_conserved());

    let ids: Vec<&str> = result.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["id001", "id002"]);

    // The surviving id001 is the first occurrence, not the duplicate payload
    assert_eq!(result.records[0].vendor_id, 2);
    assert_eq!(result.records[0].passenger_count, 1);

    let log = &result.log;
    assert_eq!(log.total_records, 8);
    assert_eq!(log.removed_records["missing_values"], 1);
    assert_eq!(log.removed_records["duplicates"], 1);
    assert_eq!(log.removed_records["invalid_timestamps"], 1);
    assert_eq!(log.removed_records["invalid_coordinates"], 1);
    assert_eq!(log.removed_records["invalid_duration"], 1);
    assert_eq!(log.removed_records["invalid_passengers"], 1);
    assert_eq!(log.null_field_occurrences["passenger_count"], 1);
}

#[test]
fn test_clean_artifacts_written_and_reloadable() {
    let dir = TempDir::new().unwrap();
    let input = write_mixed_raw_file(&dir);
    let output_dir = dir.path().join("out");

    let records = trip_reader::read_raw_trips(&input).unwrap();
    let result = TripCleaner::new(QualityRulesConfig::default()).clean(records, false);

    let artifacts = write_artifacts(&output_dir, &input, &result.records, &result.log).unwrap();

    // Cleaned CSV round-trips through the strict reader
    let reloaded = trip_reader::read_cleaned_trips(&artifacts.cleaned_data_path).unwrap();
    assert_eq!(reloaded, result.records);

    // Quality log JSON parses back identically
    let json = std::fs::read_to_string(&artifacts.log_path).unwrap();
    let parsed: CleaningLog = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, result.log);

    // Report carries the per-category breakdown
    let report = std::fs::read_to_string(&artifacts.report_path).unwrap();
    assert!(report.contains("TRIP DATA CLEANING REPORT"));
    assert!(report.contains("Total records processed: 8"));
    assert!(report.contains("missing_values: 1"));
    assert!(report.contains("invalid_coordinates: 1"));
}

#[test]
fn test_clean_derived_columns_present_in_artifact() {
    let dir = TempDir::new().unwrap();
    let input = write_mixed_raw_file(&dir);
    let output_dir = dir.path().join("out");

    let records = trip_reader::read_raw_trips(&input).unwrap();
    let result = TripCleaner::new(QualityRulesConfig::default()).clean(records, false);
    let artifacts = write_artifacts(&output_dir, &input, &result.records, &result.log).unwrap();

    let contents = std::fs::read_to_string(&artifacts.cleaned_data_path).unwrap();
    let header = contents.lines().next().unwrap();

    // Source columns first, derived columns appended
    assert!(header.starts_with("id,vendor_id,pickup_datetime"));
    for column in [
        "pickup_hour",
        "pickup_weekday",
        "trip_distance_km",
        "trip_speed_kmh",
        "trip_efficiency",
        "time_of_day",
        "is_weekend",
    ] {
        assert!(header.contains(column), "missing column {}", column);
    }
}

#[test]
fn test_clean_rejects_file_with_wrong_schema() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("not_trips.csv");
    std::fs::write(&path, "foo,bar\n1,2\n").unwrap();

    let result = trip_reader::read_raw_trips(&path);
    assert!(result.is_err());
}
