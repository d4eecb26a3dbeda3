//! Trip fact loading
//!
//! Loads the cleaned record set into the fact table in fixed-size batches.
//! Each batch commits as one atomic transaction; inserts are idempotent on
//! the trip natural-key id, so a record whose id already exists is a no-op
//! rather than an error or a duplicate. A record whose dimension references
//! cannot be resolved is rejected — counted, never fatal. After all batches
//! one [`DataQualityLogEntry`] row records the run's accounting.

use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::{Connection, params};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{Warehouse, audit, dimensions::DimensionMaps};
use crate::app::models::CleanedTripRecord;
use crate::app::models::audit::LoadOutcome;
use crate::{Error, Result};

const INSERT_FACT_SQL: &str = "INSERT OR IGNORE INTO trip_facts
     (trip_id, vendor_id, pickup_location_id, dropoff_location_id, time_id,
      pickup_datetime, dropoff_datetime, trip_duration, trip_distance_km,
      trip_speed_kmh, trip_efficiency, passenger_count, store_and_fwd_flag)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)";

/// Load cleaned records into the fact table in batches
///
/// Cancellation is honored between batches: already-committed batches remain
/// valid and the idempotent inserts make a restart safe. An unexpected
/// failure mid-batch rolls back only the in-flight batch and fails the run.
pub fn load_trip_facts(
    warehouse: &mut Warehouse,
    records: &[CleanedTripRecord],
    maps: &DimensionMaps,
    batch_size: usize,
    show_progress: bool,
    cancel: &CancellationToken,
) -> Result<LoadOutcome> {
    let batch_size = batch_size.max(1);
    let mut outcome = LoadOutcome {
        total_processed: records.len(),
        ..LoadOutcome::default()
    };

    info!(
        "Loading {} records in batches of {}",
        records.len(),
        batch_size
    );

    let pb = if show_progress {
        Some(create_load_progress_bar(records.len() as u64))
    } else {
        None
    };

    for batch in records.chunks(batch_size) {
        if cancel.is_cancelled() {
            return Err(Error::processing_interrupted(
                "Fact loading aborted between batches; committed batches remain valid",
            ));
        }

        let result = insert_batch(warehouse.connection_mut(), batch, maps)?;
        outcome.records_inserted += result.accepted;
        outcome.records_rejected += result.rejected;
        outcome.new_rows += result.new_rows;

        if let Some(pb) = &pb {
            pb.inc(batch.len() as u64);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message(format!(
            "Loaded {} records ({} rejected)",
            outcome.records_inserted, outcome.records_rejected
        ));
    }

    audit::record_load_outcome(warehouse, &outcome)?;

    info!("{}", outcome.summary());

    Ok(outcome)
}

/// Per-batch insert accounting
struct BatchResult {
    accepted: usize,
    new_rows: usize,
    rejected: usize,
}

fn insert_batch(
    conn: &mut Connection,
    batch: &[CleanedTripRecord],
    maps: &DimensionMaps,
) -> Result<BatchResult> {
    // The transaction rolls back on any early return; a batch is all-or-nothing.
    let tx = conn.transaction()?;

    let mut result = BatchResult {
        accepted: 0,
        new_rows: 0,
        rejected: 0,
    };

    {
        let mut stmt = tx.prepare(INSERT_FACT_SQL)?;

        for record in batch {
            let Some((pickup_id, dropoff_id, time_id)) = maps.resolve(record) else {
                debug!(
                    "Rejected record {}: unresolved dimension reference",
                    record.id
                );
                result.rejected += 1;
                continue;
            };

            let changed = stmt.execute(params![
                record.id,
                record.vendor_id,
                pickup_id,
                dropoff_id,
                time_id,
                record.pickup_key(),
                record
                    .dropoff_datetime
                    .format(crate::constants::TRIP_DATETIME_FORMAT)
                    .to_string(),
                record.trip_duration,
                record.trip_distance_km,
                record.trip_speed_kmh,
                record.trip_efficiency,
                record.passenger_count,
                record.store_and_fwd_flag.to_uppercase(),
            ])?;

            result.accepted += 1;
            result.new_rows += changed;
        }
    }

    tx.commit()?;

    Ok(result)
}

fn create_load_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} [{per_sec}] ETA: {eta}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message("Loading trips".to_string());
    pb
}
