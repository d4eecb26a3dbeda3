//! Derived trip feature computation
//!
//! Pure functions computing the geometric and temporal features attached to a
//! validated trip record: great-circle distance, speed, efficiency, the
//! time-of-day bucket, and the weekend flag. Callers are responsible for
//! filtering non-finite or out-of-range results afterward.

use crate::app::models::{TimeOfDay, ValidTripRecord};
use crate::constants::EARTH_RADIUS_KM;

/// Derived features for one trip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripFeatures {
    pub trip_distance_km: f64,
    pub trip_speed_kmh: f64,
    pub trip_efficiency: f64,
    pub time_of_day: TimeOfDay,
    pub is_weekend: bool,
}

/// Great-circle distance between two coordinates via the haversine formula
///
/// Inputs are decimal degrees; the result is kilometers.
pub fn haversine_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    c * EARTH_RADIUS_KM
}

/// Average trip speed in km/h given a duration in seconds
pub fn trip_speed_kmh(distance_km: f64, duration_secs: i64) -> f64 {
    distance_km / (duration_secs as f64 / 3600.0)
}

/// Trip efficiency: distance covered per minute of travel
pub fn trip_efficiency(distance_km: f64, duration_secs: i64) -> f64 {
    distance_km / (duration_secs as f64 / 60.0)
}

/// Bucket a pickup hour into a time-of-day category
pub fn time_of_day(hour: u32) -> TimeOfDay {
    match hour {
        6..12 => TimeOfDay::Morning,
        12..18 => TimeOfDay::Afternoon,
        18..22 => TimeOfDay::Evening,
        _ => TimeOfDay::Night,
    }
}

/// Weekend check for a Monday = 0 weekday number
pub fn is_weekend(weekday: u32) -> bool {
    weekday == 5 || weekday == 6
}

/// Compute all derived features for a validated trip record
pub fn derive_features(record: &ValidTripRecord) -> TripFeatures {
    let distance = haversine_distance_km(
        record.pickup_latitude,
        record.pickup_longitude,
        record.dropoff_latitude,
        record.dropoff_longitude,
    );

    TripFeatures {
        trip_distance_km: distance,
        trip_speed_kmh: trip_speed_kmh(distance, record.trip_duration),
        trip_efficiency: trip_efficiency(distance, record.trip_duration),
        time_of_day: time_of_day(record.pickup_hour),
        is_weekend: is_weekend(record.pickup_weekday),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn record_with_route(
        pickup: (f64, f64),
        dropoff: (f64, f64),
        duration: i64,
    ) -> ValidTripRecord {
        let pickup_dt =
            NaiveDateTime::parse_from_str("2016-03-14 17:24:55", "%Y-%m-%d %H:%M:%S").unwrap();

        ValidTripRecord {
            id: "id0000001".to_string(),
            vendor_id: 1,
            pickup_datetime: pickup_dt,
            dropoff_datetime: pickup_dt + chrono::Duration::seconds(duration),
            passenger_count: 1,
            pickup_longitude: pickup.1,
            pickup_latitude: pickup.0,
            dropoff_longitude: dropoff.1,
            dropoff_latitude: dropoff.0,
            store_and_fwd_flag: "N".to_string(),
            trip_duration: duration,
            pickup_hour: 17,
            pickup_day: 14,
            pickup_month: 3,
            pickup_weekday: 0,
            pickup_year: 2016,
        }
    }

    #[test]
    fn test_haversine_zero_distance() {
        let d = haversine_distance_km(40.7128, -74.0059, 40.7128, -74.0059);
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_haversine_downtown_to_midtown() {
        // City Hall to Times Square is roughly 5.4 km great-circle
        let d = haversine_distance_km(40.7128, -74.0059, 40.7589, -73.9851);
        assert!((d - 5.42).abs() < 0.05, "distance was {}", d);
    }

    #[test]
    fn test_haversine_symmetry() {
        let forward = haversine_distance_km(40.7128, -74.0059, 40.7589, -73.9851);
        let backward = haversine_distance_km(40.7589, -73.9851, 40.7128, -74.0059);
        assert!((forward - backward).abs() < 1e-12);
    }

    #[test]
    fn test_speed_and_efficiency() {
        // 6 km in 600 s is 36 km/h and 0.6 km per minute
        assert!((trip_speed_kmh(6.0, 600) - 36.0).abs() < 1e-9);
        assert!((trip_efficiency(6.0, 600) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_time_of_day_boundaries() {
        assert_eq!(time_of_day(5), TimeOfDay::Night);
        assert_eq!(time_of_day(6), TimeOfDay::Morning);
        assert_eq!(time_of_day(11), TimeOfDay::Morning);
        assert_eq!(time_of_day(12), TimeOfDay::Afternoon);
        assert_eq!(time_of_day(17), TimeOfDay::Afternoon);
        assert_eq!(time_of_day(18), TimeOfDay::Evening);
        assert_eq!(time_of_day(21), TimeOfDay::Evening);
        assert_eq!(time_of_day(22), TimeOfDay::Night);
        assert_eq!(time_of_day(0), TimeOfDay::Night);
    }

    #[test]
    fn test_is_weekend() {
        for weekday in 0..5 {
            assert!(!is_weekend(weekday), "weekday {} is not weekend", weekday);
        }
        assert!(is_weekend(5));
        assert!(is_weekend(6));
    }

    #[test]
    fn test_derive_features_typical_trip() {
        let record = record_with_route((40.7128, -74.0059), (40.7589, -73.9851), 600);
        let features = derive_features(&record);

        assert!((features.trip_distance_km - 5.42).abs() < 0.05);
        // 600 s is a tenth of an hour, so speed is distance * 6
        assert!((features.trip_speed_kmh - features.trip_distance_km * 6.0).abs() < 1e-9);
        assert!((features.trip_efficiency - features.trip_distance_km / 10.0).abs() < 1e-9);
        assert_eq!(features.time_of_day, TimeOfDay::Afternoon);
        assert!(!features.is_weekend);

        // All derived metrics fall inside the valid cleaning ranges
        assert!(features.trip_speed_kmh >= 1.0 && features.trip_speed_kmh <= 120.0);
    }

    #[test]
    fn test_derive_features_stationary_trip_is_finite() {
        let record = record_with_route((40.7128, -74.0059), (40.7128, -74.0059), 600);
        let features = derive_features(&record);

        assert_eq!(features.trip_distance_km, 0.0);
        assert_eq!(features.trip_speed_kmh, 0.0);
    }
}
