//! Application constants for the trip warehouse
//!
//! This module contains the validation thresholds, natural-key canonicalization
//! constants, and artifact names used throughout the pipeline.

// =============================================================================
// Geospatial Validation Constants
// =============================================================================

/// Service-area bounding box (approximate city limits)
pub const MIN_LATITUDE: f64 = 40.5;
pub const MAX_LATITUDE: f64 = 41.0;
pub const MIN_LONGITUDE: f64 = -74.3;
pub const MAX_LONGITUDE: f64 = -73.7;

/// Earth radius used by the haversine distance computation, in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Decimal digits retained when a coordinate is used as a natural key
pub const COORDINATE_PRECISION: u32 = 6;

/// Scale factor implied by [`COORDINATE_PRECISION`] (10^precision)
pub const COORDINATE_SCALE: f64 = 1_000_000.0;

// =============================================================================
// Trip Validation Constants
// =============================================================================

/// Trips at or below this duration are invalid (seconds)
pub const MIN_TRIP_DURATION_SECS: i64 = 60;

/// Trips above this duration are invalid (24 hours, in seconds)
pub const MAX_TRIP_DURATION_SECS: i64 = 86_400;

/// Multiplier applied to the interquartile range for duration outlier bounds
pub const IQR_OUTLIER_MULTIPLIER: f64 = 3.0;

/// Valid passenger count range for a licensed cab
pub const MIN_PASSENGER_COUNT: i64 = 1;
pub const MAX_PASSENGER_COUNT: i64 = 6;

/// Physically plausible speed range for a completed street trip (km/h)
pub const MIN_TRIP_SPEED_KMH: f64 = 1.0;
pub const MAX_TRIP_SPEED_KMH: f64 = 120.0;

// =============================================================================
// Cleaning Log Constants
// =============================================================================

/// Maximum number of dropped record ids sampled per removal category
pub const SUSPICIOUS_SAMPLE_CAP: usize = 100;

/// Removal category names, in pipeline stage order
pub mod categories {
    pub const MISSING_VALUES: &str = "missing_values";
    pub const DUPLICATES: &str = "duplicates";
    pub const INVALID_TIMESTAMPS: &str = "invalid_timestamps";
    pub const INVALID_COORDINATES: &str = "invalid_coordinates";
    pub const INVALID_DURATION: &str = "invalid_duration";
    pub const INVALID_PASSENGERS: &str = "invalid_passengers";
    pub const INVALID_SPEED: &str = "invalid_speed";

    /// All category names in stage execution order
    pub const ALL: &[&str] = &[
        MISSING_VALUES,
        DUPLICATES,
        INVALID_TIMESTAMPS,
        INVALID_COORDINATES,
        INVALID_DURATION,
        INVALID_PASSENGERS,
        INVALID_SPEED,
    ];
}

// =============================================================================
// Loading Constants
// =============================================================================

/// Default number of fact rows per batch transaction
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Rejection reason recorded when dimension lookups fail during fact loading
pub const REJECTION_REASON_MISSING_REFERENCE: &str = "missing location or time reference";

// =============================================================================
// File and Format Constants
// =============================================================================

/// Datetime format used by trip source files and the time natural key
pub const TRIP_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Cleaned dataset output filename
pub const CLEANED_DATA_FILENAME: &str = "cleaned_trips.csv";

/// Structured quality log filename
pub const CLEANING_LOG_FILENAME: &str = "cleaning_log.json";

/// Human-readable summary report filename
pub const CLEANING_REPORT_FILENAME: &str = "cleaning_report.txt";

/// Subdirectory of the output directory holding log artifacts
pub const LOGS_DIR_NAME: &str = "logs";

/// Default warehouse database filename
pub const DEFAULT_WAREHOUSE_FILENAME: &str = "warehouse.db";

/// Expected header columns of a raw trip file
pub const RAW_TRIP_COLUMNS: &[&str] = &[
    "id",
    "vendor_id",
    "pickup_datetime",
    "dropoff_datetime",
    "passenger_count",
    "pickup_longitude",
    "pickup_latitude",
    "dropoff_longitude",
    "dropoff_latitude",
    "store_and_fwd_flag",
    "trip_duration",
];

// =============================================================================
// Helper Functions
// =============================================================================

/// Round a coordinate to the natural-key precision
pub fn round_coordinate(value: f64) -> f64 {
    (value * COORDINATE_SCALE).round() / COORDINATE_SCALE
}

/// Canonical integer key for a coordinate pair (micro-degrees)
///
/// Dimension lookups key on this pair rather than raw floats so that equal
/// rounded coordinates always hash and compare identically.
pub fn coordinate_key(latitude: f64, longitude: f64) -> (i64, i64) {
    (
        (latitude * COORDINATE_SCALE).round() as i64,
        (longitude * COORDINATE_SCALE).round() as i64,
    )
}

/// Check whether a coordinate pair falls inside the service bounding box
pub fn within_bounding_box(latitude: f64, longitude: f64) -> bool {
    (MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude)
        && (MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude)
}
