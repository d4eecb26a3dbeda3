//! Dimensional warehouse access
//!
//! This module owns every warehouse-table write: schema creation, dimension
//! population, fact loading, and the append-only quality log. Readers (the
//! downstream query API) only ever consume the four tables defined here.
//!
//! # Architecture
//!
//! - [`dimensions`] - time/location dimension upserts and lookup-map building
//! - [`facts`] - batched, idempotent, transactional fact loading
//! - [`audit`] - quality-log writes and read-only integrity checks
//!
//! # Write discipline
//!
//! One load run owns exclusive write access for its duration. Dimension
//! population runs inside a single transaction; each fact batch commits as
//! one atomic unit. Every insert is keyed by a stable natural id, so re-runs
//! are safe without manual cleanup.

pub mod audit;
pub mod dimensions;
pub mod facts;

#[cfg(test)]
mod tests;

pub use audit::run_integrity_checks;
pub use dimensions::{DimensionMaps, DimensionStats, build_dimension_maps, populate_dimensions};
pub use facts::load_trip_facts;

use rusqlite::Connection;
use std::path::Path;
use tracing::info;

use crate::{Error, Result};

/// Warehouse schema: conformed dimensions, the trip fact table, and the
/// append-only data quality log
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS time_dimensions (
        time_id INTEGER PRIMARY KEY,
        pickup_datetime TEXT NOT NULL UNIQUE,
        pickup_hour INTEGER NOT NULL,
        pickup_day INTEGER NOT NULL,
        pickup_month INTEGER NOT NULL,
        pickup_weekday INTEGER NOT NULL,
        pickup_year INTEGER NOT NULL,
        time_of_day TEXT NOT NULL,
        is_weekend INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS locations (
        location_id INTEGER PRIMARY KEY,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        location_type TEXT NOT NULL,
        UNIQUE (latitude, longitude)
    );
    CREATE TABLE IF NOT EXISTS trip_facts (
        fact_id INTEGER PRIMARY KEY,
        trip_id TEXT NOT NULL UNIQUE,
        vendor_id INTEGER NOT NULL,
        pickup_location_id INTEGER NOT NULL REFERENCES locations(location_id),
        dropoff_location_id INTEGER NOT NULL REFERENCES locations(location_id),
        time_id INTEGER NOT NULL REFERENCES time_dimensions(time_id),
        pickup_datetime TEXT NOT NULL,
        dropoff_datetime TEXT NOT NULL,
        trip_duration INTEGER NOT NULL,
        trip_distance_km REAL NOT NULL,
        trip_speed_kmh REAL NOT NULL,
        trip_efficiency REAL NOT NULL,
        passenger_count INTEGER NOT NULL,
        store_and_fwd_flag TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS data_quality_log (
        log_id INTEGER PRIMARY KEY,
        total_records_processed INTEGER NOT NULL,
        records_inserted INTEGER NOT NULL,
        records_rejected INTEGER NOT NULL,
        rejection_reason TEXT,
        load_status TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_trip_facts_time ON trip_facts(time_id);
    CREATE INDEX IF NOT EXISTS idx_trip_facts_pickup_location
        ON trip_facts(pickup_location_id);
    CREATE INDEX IF NOT EXISTS idx_trip_facts_dropoff_location
        ON trip_facts(dropoff_location_id);
";

/// Open warehouse handle
///
/// Wraps the SQLite connection so that all table writes go through this
/// module. Opening applies the pragmas and creates any missing schema
/// objects, so a fresh file and an existing warehouse behave identically.
#[derive(Debug)]
pub struct Warehouse {
    conn: Connection,
}

impl Warehouse {
    /// Open (or create) a warehouse database file
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| {
            Error::warehouse(format!("Failed to open warehouse at {}", path.display()), e)
        })?;

        let warehouse = Self::from_connection(conn)?;
        info!("Opened warehouse at {}", path.display());
        Ok(warehouse)
    }

    /// Open an in-memory warehouse, used by tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::warehouse("Failed to open in-memory warehouse", e))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;
            ",
        )
        .map_err(|e| Error::warehouse("Failed to apply warehouse pragmas", e))?;

        conn.execute_batch(SCHEMA)
            .map_err(|e| Error::warehouse("Failed to initialize warehouse schema", e))?;

        Ok(Self { conn })
    }

    /// Shared connection for read queries
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Mutable connection for scoped transactions
    pub(crate) fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}
