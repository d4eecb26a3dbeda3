//! Tests for warehouse loading
//!
//! Unit tests for dimension population, fact loading, and auditing, all
//! running against in-memory warehouses.

pub mod fact_tests;

// Test helper functions and fixtures
use chrono::NaiveDateTime;
use chrono::{Datelike, Timelike};

use crate::app::models::CleanedTripRecord;
use crate::app::services::features;
use crate::constants::TRIP_DATETIME_FORMAT;

/// Create a cleaned record with explicit route and pickup time
///
/// Derived fields are computed the same way the pipeline computes them, so
/// the fixture always satisfies the cleaned-record invariants.
pub fn create_cleaned_trip_with(
    id: &str,
    pickup: (f64, f64),
    dropoff: (f64, f64),
    pickup_ts: &str,
    duration: i64,
) -> CleanedTripRecord {
    let pickup_dt = NaiveDateTime::parse_from_str(pickup_ts, TRIP_DATETIME_FORMAT).unwrap();
    let dropoff_dt = pickup_dt + chrono::Duration::seconds(duration);

    let distance = features::haversine_distance_km(pickup.0, pickup.1, dropoff.0, dropoff.1);
    let weekday = pickup_dt.weekday().num_days_from_monday();

    CleanedTripRecord {
        id: id.to_string(),
        vendor_id: 2,
        pickup_datetime: pickup_dt,
        dropoff_datetime: dropoff_dt,
        passenger_count: 1,
        pickup_longitude: pickup.1,
        pickup_latitude: pickup.0,
        dropoff_longitude: dropoff.1,
        dropoff_latitude: dropoff.0,
        store_and_fwd_flag: "n".to_string(),
        trip_duration: duration,
        pickup_hour: pickup_dt.hour(),
        pickup_day: pickup_dt.day(),
        pickup_month: pickup_dt.month(),
        pickup_weekday: weekday,
        pickup_year: pickup_dt.year(),
        trip_distance_km: distance,
        trip_speed_kmh: features::trip_speed_kmh(distance, duration),
        trip_efficiency: features::trip_efficiency(distance, duration),
        time_of_day: features::time_of_day(pickup_dt.hour()),
        is_weekend: features::is_weekend(weekday),
    }
}

/// Create a cleaned record on the default downtown-to-midtown route
pub fn create_cleaned_trip(id: &str) -> CleanedTripRecord {
    create_cleaned_trip_with(
        id,
        (40.7128, -74.0059),
        (40.7589, -73.9851),
        "2016-03-14 17:24:55",
        600,
    )
}

/// A small set of trips covering three distinct locations and two timestamps
pub fn create_trip_batch() -> Vec<CleanedTripRecord> {
    vec![
        create_cleaned_trip("trip1"),
        create_cleaned_trip_with(
            "trip2",
            (40.7589, -73.9851),
            (40.7306, -73.9866),
            "2016-03-14 18:00:00",
            900,
        ),
        create_cleaned_trip_with(
            "trip3",
            (40.7128, -74.0059),
            (40.7306, -73.9866),
            "2016-03-14 17:24:55",
            700,
        ),
    ]
}

/// Count rows in a warehouse table
pub fn count_rows(warehouse: &super::Warehouse, table: &str) -> i64 {
    warehouse
        .connection()
        .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })
        .unwrap()
}
