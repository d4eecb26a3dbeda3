//! Tests for batched fact loading

use super::{count_rows, create_cleaned_trip, create_cleaned_trip_with, create_trip_batch};
use crate::app::models::audit::LoadStatus;
use crate::app::services::warehouse::audit::read_quality_log;
use crate::app::services::warehouse::{
    Warehouse, build_dimension_maps, load_trip_facts, populate_dimensions,
};
use crate::Error;
use tokio_util::sync::CancellationToken;

fn loaded_warehouse(
    records: &[crate::app::models::CleanedTripRecord],
) -> (Warehouse, crate::app::models::audit::LoadOutcome) {
    let mut warehouse = Warehouse::open_in_memory().unwrap();
    populate_dimensions(&mut warehouse, records).unwrap();
    let maps = build_dimension_maps(&warehouse).unwrap();

    let cancel = CancellationToken::new();
    let outcome = load_trip_facts(&mut warehouse, records, &maps, 1000, false, &cancel).unwrap();
    (warehouse, outcome)
}

#[test]
fn test_load_inserts_all_resolvable_records() {
    let records = create_trip_batch();
    let (warehouse, outcome) = loaded_warehouse(&records);

    assert_eq!(outcome.total_processed, 3);
    assert_eq!(outcome.records_inserted, 3);
    assert_eq!(outcome.records_rejected, 0);
    assert_eq!(outcome.new_rows, 3);
    assert_eq!(outcome.status(), LoadStatus::Success);
    assert!(outcome.is_balanced());

    assert_eq!(count_rows(&warehouse, "trip_facts"), 3);
}

#[test]
fn test_load_is_idempotent() {
    let records = create_trip_batch();
    let (mut warehouse, _) = loaded_warehouse(&records);

    let maps = build_dimension_maps(&warehouse).unwrap();
    let cancel = CancellationToken::new();
    let second =
        load_trip_facts(&mut warehouse, &records, &maps, 1000, false, &cancel).unwrap();

    // Resubmitted ids are accepted no-ops: accounting stays balanced and the
    // fact table does not grow
    assert_eq!(second.records_inserted, 3);
    assert_eq!(second.new_rows, 0);
    assert_eq!(second.status(), LoadStatus::Success);
    assert_eq!(count_rows(&warehouse, "trip_facts"), 3);
}

#[test]
fn test_load_rejects_unresolvable_pickup() {
    let known = create_trip_batch();
    let mut warehouse = Warehouse::open_in_memory().unwrap();
    populate_dimensions(&mut warehouse, &known).unwrap();
    let maps = build_dimension_maps(&warehouse).unwrap();

    // A trip whose pickup coordinate was never observed by the resolver
    let mut records = known.clone();
    records.push(create_cleaned_trip_with(
        "orphan",
        (40.9, -74.2),
        (40.7589, -73.9851),
        "2016-03-14 17:24:55",
        600,
    ));

    let cancel = CancellationToken::new();
    let outcome = load_trip_facts(&mut warehouse, &records, &maps, 1000, false, &cancel).unwrap();

    assert_eq!(outcome.total_processed, 4);
    assert_eq!(outcome.records_inserted, 3);
    assert_eq!(outcome.records_rejected, 1);
    assert_eq!(outcome.status(), LoadStatus::Partial);
    assert!(outcome.is_balanced());

    // The orphan left no fact row behind
    assert_eq!(count_rows(&warehouse, "trip_facts"), 3);
    let orphan_count: i64 = warehouse
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM trip_facts WHERE trip_id = 'orphan'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(orphan_count, 0);
}

#[test]
fn test_load_with_empty_maps_is_failure() {
    let records = create_trip_batch();
    let mut warehouse = Warehouse::open_in_memory().unwrap();

    // No dimension rows at all: every record rejects
    let maps = build_dimension_maps(&warehouse).unwrap();
    let cancel = CancellationToken::new();
    let outcome = load_trip_facts(&mut warehouse, &records, &maps, 1000, false, &cancel).unwrap();

    assert_eq!(outcome.records_inserted, 0);
    assert_eq!(outcome.records_rejected, 3);
    assert_eq!(outcome.status(), LoadStatus::Failure);
}

#[test]
fn test_load_small_batches() {
    let records = create_trip_batch();
    let mut warehouse = Warehouse::open_in_memory().unwrap();
    populate_dimensions(&mut warehouse, &records).unwrap();
    let maps = build_dimension_maps(&warehouse).unwrap();

    let cancel = CancellationToken::new();
    let outcome = load_trip_facts(&mut warehouse, &records, &maps, 1, false, &cancel).unwrap();

    assert_eq!(outcome.records_inserted, 3);
    assert_eq!(count_rows(&warehouse, "trip_facts"), 3);
}

#[test]
fn test_load_honors_cancellation_before_first_batch() {
    let records = create_trip_batch();
    let mut warehouse = Warehouse::open_in_memory().unwrap();
    populate_dimensions(&mut warehouse, &records).unwrap();
    let maps = build_dimension_maps(&warehouse).unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = load_trip_facts(&mut warehouse, &records, &maps, 1000, false, &cancel);
    assert!(matches!(result, Err(Error::ProcessingInterrupted { .. })));

    // Nothing was committed
    assert_eq!(count_rows(&warehouse, "trip_facts"), 0);
}

#[test]
fn test_load_writes_quality_log_entry() {
    let records = create_trip_batch();
    let (warehouse, outcome) = loaded_warehouse(&records);

    let entries = read_quality_log(&warehouse).unwrap();
    assert_eq!(entries.len(), 1);

    let entry = &entries[0];
    assert_eq!(entry.total_records_processed, outcome.total_processed as i64);
    assert_eq!(entry.records_inserted, 3);
    assert_eq!(entry.records_rejected, 0);
    assert_eq!(entry.rejection_reason, None);
    assert_eq!(entry.load_status, LoadStatus::Success);
    assert!(!entry.created_at.is_empty());
}

#[test]
fn test_rejections_record_fixed_reason() {
    let known = vec![create_cleaned_trip("trip1")];
    let mut warehouse = Warehouse::open_in_memory().unwrap();
    populate_dimensions(&mut warehouse, &known).unwrap();
    let maps = build_dimension_maps(&warehouse).unwrap();

    let mut records = known.clone();
    records.push(create_cleaned_trip_with(
        "orphan",
        (40.9, -74.2),
        (40.7589, -73.9851),
        "2016-03-14 17:24:55",
        600,
    ));

    let cancel = CancellationToken::new();
    load_trip_facts(&mut warehouse, &records, &maps, 1000, false, &cancel).unwrap();

    let entries = read_quality_log(&warehouse).unwrap();
    assert_eq!(
        entries[0].rejection_reason.as_deref(),
        Some("missing location or time reference")
    );
    assert_eq!(entries[0].load_status, LoadStatus::Partial);
}

#[test]
fn test_fact_row_contents() {
    let records = vec![create_cleaned_trip("trip1")];
    let (warehouse, _) = loaded_warehouse(&records);

    let (trip_id, pickup_dt, duration, flag): (String, String, i64, String) = warehouse
        .connection()
        .query_row(
            "SELECT trip_id, pickup_datetime, trip_duration, store_and_fwd_flag
             FROM trip_facts",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .unwrap();

    assert_eq!(trip_id, "trip1");
    assert_eq!(pickup_dt, "2016-03-14 17:24:55");
    assert_eq!(duration, 600);
    // Flags are normalized to uppercase on load
    assert_eq!(flag, "N");

    // Foreign keys resolve to live dimension rows
    let joined: i64 = warehouse
        .connection()
        .query_row(
            "SELECT COUNT(*)
             FROM trip_facts f
             JOIN locations p ON p.location_id = f.pickup_location_id
             JOIN locations d ON d.location_id = f.dropoff_location_id
             JOIN time_dimensions t ON t.time_id = f.time_id",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(joined, 1);
}

#[test]
fn test_reject_only_batches_release_their_transactions() {
    // Two batches of rejects followed by a loadable batch must not deadlock
    // or leave transactions open
    let known = vec![create_cleaned_trip("resolvable")];
    let mut warehouse = Warehouse::open_in_memory().unwrap();
    populate_dimensions(&mut warehouse, &known).unwrap();
    let maps = build_dimension_maps(&warehouse).unwrap();

    let mut records = Vec::new();
    for i in 0..2 {
        records.push(create_cleaned_trip_with(
            &format!("orphan{}", i),
            (40.9, -74.2),
            (40.7589, -73.9851),
            "2016-03-14 17:24:55",
            600,
        ));
    }
    records.push(create_cleaned_trip("resolvable"));

    let cancel = CancellationToken::new();
    let outcome = load_trip_facts(&mut warehouse, &records, &maps, 1, false, &cancel).unwrap();

    assert_eq!(outcome.records_inserted, 1);
    assert_eq!(outcome.records_rejected, 2);
    assert_eq!(count_rows(&warehouse, "trip_facts"), 1);
}
