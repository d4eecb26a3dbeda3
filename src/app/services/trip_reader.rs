//! Trip CSV ingestion
//!
//! Reads raw trip files tolerantly and cleaned artifacts strictly. For raw
//! input, a row that fails deserialization is coerced into an empty record so
//! it reaches the missing-value stage and is removed there with full
//! accounting — record-level defects never abort the run. A file whose header
//! does not carry the expected trip columns is a stage-level defect and aborts
//! before any processing.

use std::path::Path;
use tracing::{info, warn};

use crate::app::models::{CleanedTripRecord, RawTripRecord};
use crate::constants::RAW_TRIP_COLUMNS;
use crate::{Error, Result};

/// Read a raw trip file into records
///
/// Malformed rows are returned as empty records (counted by the caller's
/// missing-value stage); a malformed header aborts with an error.
pub fn read_raw_trips(path: &Path) -> Result<Vec<RawTripRecord>> {
    if !path.exists() {
        return Err(Error::file_not_found(path.display().to_string()));
    }

    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        Error::csv_parsing(
            path.display().to_string(),
            "Failed to open raw trip file",
            Some(e),
        )
    })?;

    verify_raw_headers(path, &mut reader)?;

    let mut records = Vec::new();
    let mut malformed = 0usize;

    for row in reader.deserialize::<RawTripRecord>() {
        match row {
            Ok(record) => records.push(record),
            Err(_) => {
                // Routed to the missing-value stage rather than dropped here
                // so the record still shows up in the removal accounting.
                records.push(RawTripRecord::default());
                malformed += 1;
            }
        }
    }

    if malformed > 0 {
        warn!(
            "{} rows in {} could not be parsed and will be removed as missing",
            malformed,
            path.display()
        );
    }

    info!("Loaded {} records from {}", records.len(), path.display());

    Ok(records)
}

/// Read a cleaned trip artifact
///
/// The cleaned file is produced by this pipeline, so any unreadable row is a
/// stage-level defect: the whole read fails and nothing is loaded.
pub fn read_cleaned_trips(path: &Path) -> Result<Vec<CleanedTripRecord>> {
    if !path.exists() {
        return Err(Error::file_not_found(path.display().to_string()));
    }

    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        Error::csv_parsing(
            path.display().to_string(),
            "Failed to open cleaned trip file",
            Some(e),
        )
    })?;

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<CleanedTripRecord>().enumerate() {
        let record = row.map_err(|e| {
            Error::csv_parsing(
                path.display().to_string(),
                format!("Cleaned record at row {} is malformed", index + 1),
                Some(e),
            )
        })?;
        records.push(record);
    }

    info!(
        "Loaded {} cleaned records from {}",
        records.len(),
        path.display()
    );

    Ok(records)
}

/// Verify that a raw trip file carries the expected columns
///
/// Column order does not matter and extra columns are ignored; any missing
/// expected column fails the whole file.
fn verify_raw_headers(path: &Path, reader: &mut csv::Reader<std::fs::File>) -> Result<()> {
    let headers = reader.headers().map_err(|e| {
        Error::csv_parsing(
            path.display().to_string(),
            "Failed to read header row",
            Some(e),
        )
    })?;

    let present: Vec<&str> = headers.iter().map(|h| h.trim()).collect();
    let missing: Vec<&str> = RAW_TRIP_COLUMNS
        .iter()
        .copied()
        .filter(|expected| !present.contains(expected))
        .collect();

    if !missing.is_empty() {
        return Err(Error::input_format(
            path.display().to_string(),
            format!("Missing expected columns: {}", missing.join(", ")),
        ));
    }

    Ok(())
}
