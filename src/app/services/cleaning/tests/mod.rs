//! Tests for the cleaning pipeline
//!
//! This module provides unit tests for the individual validation stages, the
//! log accounting, the composed pipeline, and artifact writing.


// Test helper functions and fixtures
use crate::app::models::RawTripRecord;
use crate::config::QualityRulesConfig;

/// Create a complete, valid raw trip record
///
/// Downtown to midtown, ten minutes, one passenger; passes every stage with
/// the default rules (distance ~5.4 km, speed ~32.5 km/h).
pub fn create_test_trip(id: &str) -> RawTripRecord {
    RawTripRecord {
        id: Some(id.to_string()),
        vendor_id: Some(2),
        pickup_datetime: Some("2016-03-14 17:24:55".to_string()),
        dropoff_datetime: Some("2016-03-14 17:34:55".to_string()),
        passenger_count: Some(1),
        pickup_longitude: Some(-74.0059),
        pickup_latitude: Some(40.7128),
        dropoff_longitude: Some(-73.9851),
        dropoff_latitude: Some(40.7589),
        store_and_fwd_flag: Some("N".to_string()),
        trip_duration: Some(600),
    }
}

/// Create a valid trip with explicit timestamps
pub fn create_test_trip_at(id: &str, pickup: &str, dropoff: &str, duration: i64) -> RawTripRecord {
    let mut record = create_test_trip(id);
    record.pickup_datetime = Some(pickup.to_string());
    record.dropoff_datetime = Some(dropoff.to_string());
    record.trip_duration = Some(duration);
    record
}

/// Default validation rules used by the tests
pub fn create_test_rules() -> QualityRulesConfig {
    QualityRulesConfig::default()
}
