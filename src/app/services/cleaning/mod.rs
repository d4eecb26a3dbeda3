//! Cleaning pipeline for raw trip records
//!
//! This module provides the complete data-quality pipeline applied to raw trip
//! records before warehouse loading. Records flow through a fixed, ordered
//! sequence of validation stages; each stage shrinks the set and appends its
//! removal accounting to the [`CleaningLog`].
//!
//! # Architecture
//!
//! - [`stages`] - the ordered validation stage functions
//! - [`log`] - cleaning log accumulation and finalization
//! - [`stats`] - numeric summaries shared by the log and the outlier stage
//! - [`report`] - persistence of the cleaned set, quality log, and summary
//!
//! # Pipeline Order
//!
//! 1. Missing-value removal
//! 2. Duplicate removal (first occurrence wins)
//! 3. Timestamp validation and temporal feature extraction
//! 4. Geospatial validation against the service bounding box
//! 5. Duration validation (absolute bounds, then IQR outliers)
//! 6. Passenger-count validation
//! 7. Feature derivation and speed validation
//!
//! The order is load-bearing: later stages assume the invariants established
//! by earlier ones. Conservation holds across the whole pipeline — every input
//! record is either in the final set or counted under exactly one category.

pub mod log;
pub mod report;
pub mod stages;
pub mod stats;

#[cfg(test)]
mod tests;

// Re-export main types for easy access
pub use log::{CleaningLog, CleaningStatistics};
pub use report::{CleaningArtifacts, write_artifacts};
pub use stats::MetricSummary;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::app::models::{CleanedTripRecord, RawTripRecord};
use crate::config::QualityRulesConfig;

/// Result of one cleaning pipeline run
#[derive(Debug, Clone)]
pub struct CleaningResult {
    /// Records that passed every validation stage
    pub records: Vec<CleanedTripRecord>,
    /// Finalized quality log
    pub log: CleaningLog,
}

impl CleaningResult {
    /// Number of surviving records
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Conservation check across the whole pipeline
    pub fn is_conserved(&self) -> bool {
        self.log.is_conserved(self.records.len())
    }
}

/// Cleaning pipeline driver
///
/// Owns the validation thresholds and runs the ordered stage list over a raw
/// record set, threading the record set and log explicitly through each stage.
#[derive(Debug, Clone)]
pub struct TripCleaner {
    rules: QualityRulesConfig,
}

impl TripCleaner {
    /// Create a cleaner with the given validation rules
    pub fn new(rules: QualityRulesConfig) -> Self {
        Self { rules }
    }

    /// Run the full validation pipeline over a raw record set
    ///
    /// Returns the cleaned records and a finalized [`CleaningLog`] whose
    /// statistics block describes the surviving set.
    pub fn clean(&self, records: Vec<RawTripRecord>, show_progress: bool) -> CleaningResult {
        let mut log = CleaningLog::new(records.len());

        info!(
            "Starting cleaning pipeline for {} raw records",
            records.len()
        );

        let records = self.run_stage(records.len(), "Missing values", show_progress, |pb| {
            stages::remove_missing_values(records, &mut log, pb)
        });

        let records = self.run_stage(records.len(), "Duplicates", show_progress, |pb| {
            stages::remove_duplicates(records, &mut log, pb)
        });

        let records = self.run_stage(records.len(), "Timestamps", show_progress, |pb| {
            stages::validate_timestamps(records, &mut log, pb)
        });

        let records = self.run_stage(records.len(), "Coordinates", show_progress, |pb| {
            stages::validate_coordinates(records, &self.rules, &mut log, pb)
        });

        let records = self.run_stage(records.len(), "Durations", show_progress, |pb| {
            stages::validate_durations(records, &self.rules, &mut log, pb)
        });

        let records = self.run_stage(records.len(), "Passenger counts", show_progress, |pb| {
            stages::validate_passenger_counts(records, &self.rules, &mut log, pb)
        });

        let cleaned = self.run_stage(records.len(), "Derived features", show_progress, |pb| {
            stages::derive_and_validate_speed(records, &self.rules, &mut log, pb)
        });

        log.finalize(&cleaned);

        info!(
            "Cleaning pipeline complete: {} -> {} records ({} removed)",
            log.total_records,
            cleaned.len(),
            log.removed_total()
        );

        CleaningResult {
            records: cleaned,
            log,
        }
    }

    /// Validation rules used by this cleaner
    pub fn rules(&self) -> &QualityRulesConfig {
        &self.rules
    }

    /// Run one stage with an optional progress bar around it
    fn run_stage<T, F>(&self, input_len: usize, label: &str, show_progress: bool, stage: F) -> T
    where
        F: FnOnce(Option<&ProgressBar>) -> T,
    {
        let pb = if show_progress {
            Some(create_stage_progress_bar(input_len as u64, label))
        } else {
            None
        };

        let result = stage(pb.as_ref());

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        result
    }
}

/// Create a progress bar for a cleaning stage
fn create_stage_progress_bar(total: u64, operation: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message(operation.to_string());
    pb
}
