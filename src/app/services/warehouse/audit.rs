//! Load auditing and integrity checks
//!
//! Appends data-quality log rows for completed load runs and runs the
//! read-only post-load consistency queries. The integrity check is a sanity
//! report, not a correctness gate: it never blocks or rolls anything back.

use rusqlite::params;
use std::str::FromStr;
use tracing::info;

use super::Warehouse;
use crate::app::models::audit::{DataQualityLogEntry, IntegrityReport, LoadOutcome, LoadStatus};
use crate::Result;

/// Append one data-quality log row for a completed load run
pub fn record_load_outcome(warehouse: &Warehouse, outcome: &LoadOutcome) -> Result<()> {
    warehouse.connection().execute(
        "INSERT INTO data_quality_log
         (total_records_processed, records_inserted, records_rejected,
          rejection_reason, load_status)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            outcome.total_processed as i64,
            outcome.records_inserted as i64,
            outcome.records_rejected as i64,
            outcome.rejection_reason(),
            outcome.status().as_str(),
        ],
    )?;

    info!(
        "Recorded load outcome: status {}, {} rejected",
        outcome.status(),
        outcome.records_rejected
    );

    Ok(())
}

/// Read the data-quality log, oldest entry first
pub fn read_quality_log(warehouse: &Warehouse) -> Result<Vec<DataQualityLogEntry>> {
    let conn = warehouse.connection();
    let mut stmt = conn.prepare(
        "SELECT total_records_processed, records_inserted, records_rejected,
                rejection_reason, load_status, created_at
         FROM data_quality_log
         ORDER BY log_id",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (processed, inserted, rejected, reason, status, created_at) = row?;
        entries.push(DataQualityLogEntry {
            total_records_processed: processed,
            records_inserted: inserted,
            records_rejected: rejected,
            rejection_reason: reason,
            load_status: LoadStatus::from_str(&status)?,
            created_at,
        });
    }

    Ok(entries)
}

/// Run the fixed set of post-load aggregate queries
pub fn run_integrity_checks(warehouse: &Warehouse) -> Result<IntegrityReport> {
    let conn = warehouse.connection();

    let count = |table: &str| -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        Ok(conn.query_row(&sql, [], |row| row.get(0))?)
    };

    let total_trips = count("trip_facts")?;
    let total_locations = count("locations")?;
    let total_time_dimensions = count("time_dimensions")?;

    let (avg_distance, avg_duration, avg_speed) = conn.query_row(
        "SELECT AVG(trip_distance_km), AVG(trip_duration), AVG(trip_speed_kmh)
         FROM trip_facts",
        [],
        |row| {
            Ok((
                row.get::<_, Option<f64>>(0)?,
                row.get::<_, Option<f64>>(1)?,
                row.get::<_, Option<f64>>(2)?,
            ))
        },
    )?;

    let (first_pickup, last_pickup) = conn.query_row(
        "SELECT MIN(pickup_datetime), MAX(pickup_datetime) FROM trip_facts",
        [],
        |row| {
            Ok((
                row.get::<_, Option<String>>(0)?,
                row.get::<_, Option<String>>(1)?,
            ))
        },
    )?;

    Ok(IntegrityReport {
        total_trips,
        total_locations,
        total_time_dimensions,
        avg_trip_distance_km: avg_distance,
        avg_trip_duration_secs: avg_duration,
        avg_trip_speed_kmh: avg_speed,
        first_pickup,
        last_pickup,
    })
}
