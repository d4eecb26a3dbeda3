//! Data models for load auditing and integrity reporting
//!
//! This module contains structures describing the outcome of a fact-load run,
//! the append-only data-quality log rows, and the post-load integrity report.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{Error, Result};

// =============================================================================
// Load Status
// =============================================================================

/// Overall status of one fact-load run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadStatus {
    /// Every processed record was accepted
    Success,
    /// Some records were rejected but at least one was accepted
    Partial,
    /// Records were processed but none were accepted
    Failure,
}

impl LoadStatus {
    /// Stable uppercase name stored in the data quality log
    pub fn as_str(self) -> &'static str {
        match self {
            LoadStatus::Success => "SUCCESS",
            LoadStatus::Partial => "PARTIAL",
            LoadStatus::Failure => "FAILURE",
        }
    }
}

impl FromStr for LoadStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "SUCCESS" => Ok(LoadStatus::Success),
            "PARTIAL" => Ok(LoadStatus::Partial),
            "FAILURE" => Ok(LoadStatus::Failure),
            other => Err(Error::data_validation(format!(
                "Invalid load status '{}': must be SUCCESS, PARTIAL, or FAILURE",
                other
            ))),
        }
    }
}

impl std::fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Load Outcome
// =============================================================================

/// Aggregate accounting for one fact-load run
///
/// Invariant: `total_processed == records_inserted + records_rejected`.
/// `records_inserted` counts rows accepted into batch inserts; a resubmitted
/// trip id is a no-op in the warehouse but still counts as accepted, so the
/// invariant holds on re-runs. `new_rows` carries the actually-created count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadOutcome {
    /// Number of cleaned records examined
    pub total_processed: usize,

    /// Number of records accepted into batch inserts
    pub records_inserted: usize,

    /// Number of records rejected for unresolved dimension references
    pub records_rejected: usize,

    /// Number of fact rows newly created in the warehouse
    pub new_rows: usize,
}

impl LoadOutcome {
    /// Classify the run outcome
    pub fn status(&self) -> LoadStatus {
        if self.total_processed > 0 && self.records_inserted == 0 {
            LoadStatus::Failure
        } else if self.records_rejected == 0 {
            LoadStatus::Success
        } else {
            LoadStatus::Partial
        }
    }

    /// Rejection reason recorded alongside this outcome, if any
    pub fn rejection_reason(&self) -> Option<&'static str> {
        if self.records_rejected > 0 {
            Some(crate::constants::REJECTION_REASON_MISSING_REFERENCE)
        } else {
            None
        }
    }

    /// Check the accounting invariant
    pub fn is_balanced(&self) -> bool {
        self.total_processed == self.records_inserted + self.records_rejected
    }

    /// Summary line for logging
    pub fn summary(&self) -> String {
        format!(
            "Load outcome: {} processed, {} inserted ({} new rows), {} rejected, status {}",
            self.total_processed,
            self.records_inserted,
            self.new_rows,
            self.records_rejected,
            self.status()
        )
    }
}

// =============================================================================
// Data Quality Log Entry
// =============================================================================

/// One append-only row of the warehouse data quality log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityLogEntry {
    pub total_records_processed: i64,
    pub records_inserted: i64,
    pub records_rejected: i64,
    pub rejection_reason: Option<String>,
    pub load_status: LoadStatus,
    pub created_at: String,
}

// =============================================================================
// Integrity Report
// =============================================================================

/// Read-only post-load aggregate checks over the warehouse
///
/// Averages are `None` when the fact table is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub total_trips: i64,
    pub total_locations: i64,
    pub total_time_dimensions: i64,
    pub avg_trip_distance_km: Option<f64>,
    pub avg_trip_duration_secs: Option<f64>,
    pub avg_trip_speed_kmh: Option<f64>,
    pub first_pickup: Option<String>,
    pub last_pickup: Option<String>,
}

impl IntegrityReport {
    /// Human-readable report lines in a fixed order
    pub fn lines(&self) -> Vec<String> {
        fn fmt_avg(value: Option<f64>) -> String {
            match value {
                Some(v) => format!("{:.2}", v),
                None => "n/a".to_string(),
            }
        }

        vec![
            format!("Total trips: {}", self.total_trips),
            format!("Total locations: {}", self.total_locations),
            format!("Total time dimensions: {}", self.total_time_dimensions),
            format!(
                "Average trip distance (km): {}",
                fmt_avg(self.avg_trip_distance_km)
            ),
            format!(
                "Average trip duration (sec): {}",
                fmt_avg(self.avg_trip_duration_secs)
            ),
            format!("Average speed (km/h): {}", fmt_avg(self.avg_trip_speed_kmh)),
            format!(
                "Date range: {} to {}",
                self.first_pickup.as_deref().unwrap_or("n/a"),
                self.last_pickup.as_deref().unwrap_or("n/a")
            ),
        ]
    }
}
