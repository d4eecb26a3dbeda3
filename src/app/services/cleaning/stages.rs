//! Validation pipeline stages
//!
//! Each stage consumes the record set produced by the previous stage and
//! returns a possibly smaller set, appending its removal count (and a bounded
//! sample of dropped ids) to the [`CleaningLog`] under a named category.
//! Stage order matters: later stages assume the invariants established by
//! earlier ones (non-null fields, valid timestamp ordering). Every stage is
//! total — malformed values route to removal, never to a panic.

use chrono::{Datelike, NaiveDateTime, Timelike};
use indicatif::ProgressBar;
use std::collections::HashSet;
use tracing::{debug, info};

use super::log::CleaningLog;
use super::stats::quantile;
use crate::app::models::{CleanedTripRecord, RawTripRecord, ValidTripRecord};
use crate::app::services::features;
use crate::config::QualityRulesConfig;
use crate::constants::{TRIP_DATETIME_FORMAT, categories};

/// Stage 1: drop records with any absent required field
///
/// Also records per-column null occurrence counts observed before removal.
pub fn remove_missing_values(
    records: Vec<RawTripRecord>,
    log: &mut CleaningLog,
    progress: Option<&ProgressBar>,
) -> Vec<RawTripRecord> {
    let initial = records.len();
    let mut kept = Vec::with_capacity(initial);
    let mut removed = 0;

    for record in records {
        let missing = record.missing_fields();
        if missing.is_empty() {
            kept.push(record);
        } else {
            for column in &missing {
                log.record_null_field(column);
            }
            if let Some(id) = record.id.as_deref() {
                log.record_suspicious(categories::MISSING_VALUES, id);
            }
            removed += 1;
        }

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    log.record_removal(categories::MISSING_VALUES, removed);
    info!(
        "Missing-value removal: {} -> {} records ({} removed)",
        initial,
        kept.len(),
        removed
    );

    kept
}

/// Stage 2: drop records whose id already appeared, keeping the first
pub fn remove_duplicates(
    records: Vec<RawTripRecord>,
    log: &mut CleaningLog,
    progress: Option<&ProgressBar>,
) -> Vec<RawTripRecord> {
    let initial = records.len();
    let mut seen: HashSet<String> = HashSet::with_capacity(initial);
    let mut kept = Vec::with_capacity(initial);
    let mut removed = 0;

    for record in records {
        let id = record.id.clone().unwrap_or_default();
        if seen.insert(id.clone()) {
            kept.push(record);
        } else {
            log.record_suspicious(categories::DUPLICATES, &id);
            removed += 1;
        }

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    log.record_removal(categories::DUPLICATES, removed);
    info!(
        "Duplicate removal: {} -> {} records ({} removed)",
        initial,
        kept.len(),
        removed
    );

    kept
}

/// Stage 3: parse timestamps, enforce ordering, extract temporal features
///
/// Records with unparseable timestamps, or where dropoff is not strictly
/// after pickup, are dropped. Survivors become fully typed records carrying
/// hour/day/month/weekday/year derived from the pickup timestamp.
pub fn validate_timestamps(
    records: Vec<RawTripRecord>,
    log: &mut CleaningLog,
    progress: Option<&ProgressBar>,
) -> Vec<ValidTripRecord> {
    let initial = records.len();
    let mut kept = Vec::with_capacity(initial);
    let mut removed = 0;

    for record in records {
        match to_valid_record(&record) {
            Some(valid) => kept.push(valid),
            None => {
                if let Some(id) = record.id.as_deref() {
                    log.record_suspicious(categories::INVALID_TIMESTAMPS, id);
                }
                removed += 1;
            }
        }

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    log.record_removal(categories::INVALID_TIMESTAMPS, removed);
    info!(
        "Timestamp validation: {} -> {} records ({} removed)",
        initial,
        kept.len(),
        removed
    );

    kept
}

/// Stage 4: drop records with either endpoint outside the bounding box
///
/// A coordinate of exactly zero on either axis is invalid regardless of the
/// configured box.
pub fn validate_coordinates(
    records: Vec<ValidTripRecord>,
    rules: &QualityRulesConfig,
    log: &mut CleaningLog,
    progress: Option<&ProgressBar>,
) -> Vec<ValidTripRecord> {
    let initial = records.len();
    let mut kept = Vec::with_capacity(initial);
    let mut removed = 0;

    let in_box = |lat: f64, lon: f64| {
        (rules.min_latitude..=rules.max_latitude).contains(&lat)
            && (rules.min_longitude..=rules.max_longitude).contains(&lon)
    };

    for record in records {
        let has_zero = record.pickup_latitude == 0.0
            || record.pickup_longitude == 0.0
            || record.dropoff_latitude == 0.0
            || record.dropoff_longitude == 0.0;

        let valid = !has_zero
            && in_box(record.pickup_latitude, record.pickup_longitude)
            && in_box(record.dropoff_latitude, record.dropoff_longitude);

        if valid {
            kept.push(record);
        } else {
            log.record_suspicious(categories::INVALID_COORDINATES, &record.id);
            removed += 1;
        }

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    log.record_removal(categories::INVALID_COORDINATES, removed);
    info!(
        "Coordinate validation: {} -> {} records ({} removed)",
        initial,
        kept.len(),
        removed
    );

    kept
}

/// Stage 5: drop absolute and statistical duration outliers
///
/// Absolute bounds first (duration must exceed the minimum and not exceed the
/// maximum), then an interquartile-range filter over the surviving
/// distribution with bounds [Q1 - k*IQR, Q3 + k*IQR]. Both sub-steps share
/// the one `invalid_duration` category total.
pub fn validate_durations(
    records: Vec<ValidTripRecord>,
    rules: &QualityRulesConfig,
    log: &mut CleaningLog,
    progress: Option<&ProgressBar>,
) -> Vec<ValidTripRecord> {
    let initial = records.len();
    let mut survivors = Vec::with_capacity(initial);
    let mut removed = 0;

    for record in records {
        if record.trip_duration > rules.min_duration_secs
            && record.trip_duration <= rules.max_duration_secs
        {
            survivors.push(record);
        } else {
            log.record_suspicious(categories::INVALID_DURATION, &record.id);
            removed += 1;
        }

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    let absolute_removed = removed;

    // IQR bounds come from the distribution that survived the absolute bounds
    let mut kept = Vec::with_capacity(survivors.len());
    if survivors.len() >= 2 {
        let mut durations: Vec<f64> = survivors.iter().map(|r| r.trip_duration as f64).collect();
        durations.sort_by(|a, b| a.total_cmp(b));

        let q1 = quantile(&durations, 0.25);
        let q3 = quantile(&durations, 0.75);
        let iqr = q3 - q1;
        let lower = q1 - rules.iqr_multiplier * iqr;
        let upper = q3 + rules.iqr_multiplier * iqr;

        debug!(
            "Duration outlier bounds: [{:.1}, {:.1}] (Q1 {:.1}, Q3 {:.1})",
            lower, upper, q1, q3
        );

        for record in survivors {
            let duration = record.trip_duration as f64;
            if duration < lower || duration > upper {
                log.record_suspicious(categories::INVALID_DURATION, &record.id);
                removed += 1;
            } else {
                kept.push(record);
            }
        }
    } else {
        kept = survivors;
    }

    log.record_removal(categories::INVALID_DURATION, removed);
    info!(
        "Duration validation: {} -> {} records ({} absolute, {} outliers)",
        initial,
        kept.len(),
        absolute_removed,
        removed - absolute_removed
    );

    kept
}

/// Stage 6: drop records with passenger counts outside the allowed range
pub fn validate_passenger_counts(
    records: Vec<ValidTripRecord>,
    rules: &QualityRulesConfig,
    log: &mut CleaningLog,
    progress: Option<&ProgressBar>,
) -> Vec<ValidTripRecord> {
    let initial = records.len();
    let mut kept = Vec::with_capacity(initial);
    let mut removed = 0;

    for record in records {
        if (rules.min_passengers..=rules.max_passengers).contains(&record.passenger_count) {
            kept.push(record);
        } else {
            log.record_suspicious(categories::INVALID_PASSENGERS, &record.id);
            removed += 1;
        }

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    log.record_removal(categories::INVALID_PASSENGERS, removed);
    info!(
        "Passenger-count validation: {} -> {} records ({} removed)",
        initial,
        kept.len(),
        removed
    );

    kept
}

/// Stage 7: derive trip features, then drop physically implausible speeds
pub fn derive_and_validate_speed(
    records: Vec<ValidTripRecord>,
    rules: &QualityRulesConfig,
    log: &mut CleaningLog,
    progress: Option<&ProgressBar>,
) -> Vec<CleanedTripRecord> {
    let initial = records.len();
    let mut kept = Vec::with_capacity(initial);
    let mut removed = 0;

    for record in records {
        let derived = features::derive_features(&record);

        let plausible = derived.trip_speed_kmh.is_finite()
            && derived.trip_speed_kmh >= rules.min_speed_kmh
            && derived.trip_speed_kmh <= rules.max_speed_kmh;

        if plausible {
            kept.push(CleanedTripRecord {
                id: record.id,
                vendor_id: record.vendor_id,
                pickup_datetime: record.pickup_datetime,
                dropoff_datetime: record.dropoff_datetime,
                passenger_count: record.passenger_count,
                pickup_longitude: record.pickup_longitude,
                pickup_latitude: record.pickup_latitude,
                dropoff_longitude: record.dropoff_longitude,
                dropoff_latitude: record.dropoff_latitude,
                store_and_fwd_flag: record.store_and_fwd_flag,
                trip_duration: record.trip_duration,
                pickup_hour: record.pickup_hour,
                pickup_day: record.pickup_day,
                pickup_month: record.pickup_month,
                pickup_weekday: record.pickup_weekday,
                pickup_year: record.pickup_year,
                trip_distance_km: derived.trip_distance_km,
                trip_speed_kmh: derived.trip_speed_kmh,
                trip_efficiency: derived.trip_efficiency,
                time_of_day: derived.time_of_day,
                is_weekend: derived.is_weekend,
            });
        } else {
            log.record_suspicious(categories::INVALID_SPEED, &record.id);
            removed += 1;
        }

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    log.record_removal(categories::INVALID_SPEED, removed);
    info!(
        "Speed validation: {} -> {} records ({} removed)",
        initial,
        kept.len(),
        removed
    );

    kept
}

/// Convert a raw record into a typed record, extracting temporal features
///
/// Returns `None` when any field is absent, a timestamp does not parse, or
/// the dropoff is not strictly after the pickup.
fn to_valid_record(record: &RawTripRecord) -> Option<ValidTripRecord> {
    let pickup = parse_trip_datetime(record.pickup_datetime.as_deref()?)?;
    let dropoff = parse_trip_datetime(record.dropoff_datetime.as_deref()?)?;

    if dropoff <= pickup {
        return None;
    }

    Some(ValidTripRecord {
        id: record.id.clone()?,
        vendor_id: record.vendor_id?,
        pickup_datetime: pickup,
        dropoff_datetime: dropoff,
        passenger_count: record.passenger_count?,
        pickup_longitude: record.pickup_longitude?,
        pickup_latitude: record.pickup_latitude?,
        dropoff_longitude: record.dropoff_longitude?,
        dropoff_latitude: record.dropoff_latitude?,
        store_and_fwd_flag: record.store_and_fwd_flag.clone()?,
        trip_duration: record.trip_duration?,
        pickup_hour: pickup.hour(),
        pickup_day: pickup.day(),
        pickup_month: pickup.month(),
        pickup_weekday: pickup.weekday().num_days_from_monday(),
        pickup_year: pickup.year(),
    })
}

fn parse_trip_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), TRIP_DATETIME_FORMAT).ok()
}
