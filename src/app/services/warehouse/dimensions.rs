//! Dimension population and surrogate-key resolution
//!
//! Deduplicates the cleaned record set into time and location dimension rows,
//! upserts them by natural key, and builds the in-memory lookup maps used by
//! fact loading. All upserts for one populate call run inside a single
//! transaction: a failure rolls the whole step back so the caller never
//! proceeds to fact loading with partial dimension maps.

use rusqlite::{Transaction, params};
use std::collections::HashMap;
use tracing::{debug, info};

use super::Warehouse;
use crate::app::models::{CleanedTripRecord, LocationType};
use crate::constants::{coordinate_key, round_coordinate};
use crate::{Error, Result};

/// Natural-key → surrogate-key lookup maps for fact loading
///
/// Locations key on the canonical micro-degree coordinate pair, times on the
/// normalized pickup timestamp string, so lookups never compare raw floats.
#[derive(Debug, Clone, Default)]
pub struct DimensionMaps {
    pub locations: HashMap<(i64, i64), i64>,
    pub times: HashMap<String, i64>,
}

impl DimensionMaps {
    /// Resolve the surrogate keys for one record: (pickup, dropoff, time)
    pub fn resolve(&self, record: &CleanedTripRecord) -> Option<(i64, i64, i64)> {
        let pickup = *self.locations.get(&record.pickup_coordinate_key())?;
        let dropoff = *self.locations.get(&record.dropoff_coordinate_key())?;
        let time = *self.times.get(&record.pickup_key())?;
        Some((pickup, dropoff, time))
    }
}

/// Counts of distinct dimension entries submitted by one populate call
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DimensionStats {
    pub time_entries: usize,
    pub location_entries: usize,
}

/// Upsert the time and location dimensions for a cleaned record set
///
/// Insert-if-absent on the natural key (exact timestamp, rounded coordinate
/// pair). A location already present under the complementary role is promoted
/// to `both`; nothing else about an existing row ever changes.
pub fn populate_dimensions(
    warehouse: &mut Warehouse,
    records: &[CleanedTripRecord],
) -> Result<DimensionStats> {
    let tx = warehouse.connection_mut().transaction()?;

    let time_entries = upsert_time_dimensions(&tx, records).map_err(rolled_back)?;
    let location_entries = upsert_locations(&tx, records).map_err(rolled_back)?;

    tx.commit()?;

    info!(
        "Dimension population complete: {} time entries, {} location entries",
        time_entries, location_entries
    );

    Ok(DimensionStats {
        time_entries,
        location_entries,
    })
}

/// Build the lookup maps from the dimension tables
pub fn build_dimension_maps(warehouse: &Warehouse) -> Result<DimensionMaps> {
    let conn = warehouse.connection();
    let mut maps = DimensionMaps::default();

    let mut stmt = conn.prepare("SELECT location_id, latitude, longitude FROM locations")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, f64>(1)?,
            row.get::<_, f64>(2)?,
        ))
    })?;
    for row in rows {
        let (location_id, latitude, longitude) = row?;
        maps.locations
            .insert(coordinate_key(latitude, longitude), location_id);
    }

    let mut stmt = conn.prepare("SELECT time_id, pickup_datetime FROM time_dimensions")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
    })?;
    for row in rows {
        let (time_id, pickup_datetime) = row?;
        maps.times.insert(pickup_datetime, time_id);
    }

    debug!(
        "Built dimension maps: {} locations, {} times",
        maps.locations.len(),
        maps.times.len()
    );

    Ok(maps)
}

/// Dropping the transaction on the error path rolls the whole step back;
/// the caller sees it as one failed resolution, never partial maps
fn rolled_back(source: Error) -> Error {
    Error::dimension_resolution(format!("dimension upserts rolled back: {}", source))
}

fn upsert_time_dimensions(tx: &Transaction<'_>, records: &[CleanedTripRecord]) -> Result<usize> {
    // One entry per distinct pickup timestamp; duplicates carry identical
    // derived fields, so first occurrence wins.
    let mut distinct: HashMap<String, &CleanedTripRecord> = HashMap::new();
    for record in records {
        distinct.entry(record.pickup_key()).or_insert(record);
    }

    let mut stmt = tx.prepare(
        "INSERT INTO time_dimensions
         (pickup_datetime, pickup_hour, pickup_day, pickup_month,
          pickup_weekday, pickup_year, time_of_day, is_weekend)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT (pickup_datetime) DO NOTHING",
    )?;

    for (key, record) in &distinct {
        stmt.execute(params![
            key,
            record.pickup_hour,
            record.pickup_day,
            record.pickup_month,
            record.pickup_weekday,
            record.pickup_year,
            record.time_of_day.as_str(),
            record.is_weekend as i64,
        ])?;
    }

    Ok(distinct.len())
}

fn upsert_locations(tx: &Transaction<'_>, records: &[CleanedTripRecord]) -> Result<usize> {
    // Union type-tag every distinct rounded coordinate: a coordinate observed
    // as both a pickup and a dropoff in this batch is `both`.
    let mut distinct: HashMap<(i64, i64), (f64, f64, LocationType)> = HashMap::new();

    for record in records {
        distinct
            .entry(record.pickup_coordinate_key())
            .or_insert_with(|| {
                (
                    round_coordinate(record.pickup_latitude),
                    round_coordinate(record.pickup_longitude),
                    LocationType::Pickup,
                )
            });
    }

    for record in records {
        distinct
            .entry(record.dropoff_coordinate_key())
            .and_modify(|entry| {
                if entry.2 == LocationType::Pickup {
                    entry.2 = LocationType::Both;
                }
            })
            .or_insert_with(|| {
                (
                    round_coordinate(record.dropoff_latitude),
                    round_coordinate(record.dropoff_longitude),
                    LocationType::Dropoff,
                )
            });
    }

    // Insert-if-absent; an existing row observed under the complementary role
    // on a later run is promoted to 'both' and never otherwise updated.
    let mut stmt = tx.prepare(
        "INSERT INTO locations (latitude, longitude, location_type)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (latitude, longitude) DO UPDATE SET location_type = 'both'
         WHERE locations.location_type <> excluded.location_type
           AND locations.location_type <> 'both'",
    )?;

    for (latitude, longitude, location_type) in distinct.values() {
        stmt.execute(params![latitude, longitude, location_type.as_str()])?;
    }

    Ok(distinct.len())
}
