//! Cleaning log accumulation
//!
//! The [`CleaningLog`] is the unit of auditability for data-quality claims:
//! every stage records how many records it removed under a named category, a
//! bounded sample of the dropped ids, and the per-column null occurrences seen
//! before removal. Once the pipeline finishes the log is finalized with
//! descriptive statistics of the surviving set and must not change afterward.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::stats::MetricSummary;
use crate::app::models::CleanedTripRecord;
use crate::constants::SUSPICIOUS_SAMPLE_CAP;

/// Quality log for one cleaning pipeline run
///
/// Category insertion order matches stage execution order; `IndexMap`
/// preserves it through the JSON artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningLog {
    /// Number of records entering the pipeline
    pub total_records: usize,

    /// Records removed per category, in stage execution order
    pub removed_records: IndexMap<String, usize>,

    /// Null occurrences per source column observed before removal
    pub null_field_occurrences: IndexMap<String, usize>,

    /// Bounded sample of dropped record ids per category
    pub suspicious_records: IndexMap<String, Vec<String>>,

    /// Final-set statistics; populated by [`CleaningLog::finalize`]
    pub statistics: Option<CleaningStatistics>,
}

/// Descriptive statistics of the cleaned record set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningStatistics {
    pub final_record_count: usize,
    pub records_removed: usize,
    /// Removed / total, as a percentage rounded to two decimals
    pub removal_percentage: f64,
    pub trip_duration: MetricSummary,
    pub trip_distance: MetricSummary,
    pub trip_speed: MetricSummary,
}

impl CleaningLog {
    /// Create a log for a pipeline run over `total_records` records
    pub fn new(total_records: usize) -> Self {
        Self {
            total_records,
            removed_records: IndexMap::new(),
            null_field_occurrences: IndexMap::new(),
            suspicious_records: IndexMap::new(),
            statistics: None,
        }
    }

    /// Record the removal count for a category
    ///
    /// Every stage records its category even when the count is zero so the
    /// artifact always carries the full stage list in order.
    pub fn record_removal(&mut self, category: &str, count: usize) {
        *self.removed_records.entry(category.to_string()).or_insert(0) += count;
    }

    /// Record one observed null occurrence for a source column
    pub fn record_null_field(&mut self, column: &str) {
        *self
            .null_field_occurrences
            .entry(column.to_string())
            .or_insert(0) += 1;
    }

    /// Sample a dropped record id under a category, up to the cap
    pub fn record_suspicious(&mut self, category: &str, id: &str) {
        let samples = self
            .suspicious_records
            .entry(category.to_string())
            .or_default();
        if samples.len() < SUSPICIOUS_SAMPLE_CAP {
            samples.push(id.to_string());
        }
    }

    /// Total records removed across all categories
    pub fn removed_total(&self) -> usize {
        self.removed_records.values().sum()
    }

    /// Conservation check: every input record is either kept or counted
    pub fn is_conserved(&self, final_count: usize) -> bool {
        self.total_records == final_count + self.removed_total()
    }

    /// Populate the statistics block from the final record set
    pub fn finalize(&mut self, records: &[CleanedTripRecord]) {
        let durations: Vec<f64> = records.iter().map(|r| r.trip_duration as f64).collect();
        let distances: Vec<f64> = records.iter().map(|r| r.trip_distance_km).collect();
        let speeds: Vec<f64> = records.iter().map(|r| r.trip_speed_kmh).collect();

        let removed = self.removed_total();
        let removal_percentage = if self.total_records == 0 {
            0.0
        } else {
            let raw = removed as f64 / self.total_records as f64 * 100.0;
            (raw * 100.0).round() / 100.0
        };

        self.statistics = Some(CleaningStatistics {
            final_record_count: records.len(),
            records_removed: removed,
            removal_percentage,
            trip_duration: MetricSummary::from_values(&durations),
            trip_distance: MetricSummary::from_values(&distances),
            trip_speed: MetricSummary::from_values(&speeds),
        });
    }
}
