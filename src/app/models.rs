//! Data models for trip records
//!
//! This module contains the core data structures for representing raw trip
//! records as ingested, validated records mid-pipeline, and fully cleaned
//! records carrying derived features. Audit and warehouse outcome models live
//! in [`audit`].

use crate::constants::{self, TRIP_DATETIME_FORMAT};
use crate::{Error, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub mod audit;

// =============================================================================
// Raw Trip Record
// =============================================================================

/// A trip record exactly as read from the source file
///
/// Every payload field is optional so that rows with missing values survive
/// deserialization and are removed (and counted) by the missing-value stage
/// instead of aborting the run. Never mutated after ingestion.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawTripRecord {
    /// Natural-key trip identifier
    pub id: Option<String>,

    /// Fleet vendor identifier
    pub vendor_id: Option<i64>,

    /// Pickup timestamp string (`%Y-%m-%d %H:%M:%S`)
    pub pickup_datetime: Option<String>,

    /// Dropoff timestamp string (`%Y-%m-%d %H:%M:%S`)
    pub dropoff_datetime: Option<String>,

    /// Reported passenger count
    pub passenger_count: Option<i64>,

    pub pickup_longitude: Option<f64>,
    pub pickup_latitude: Option<f64>,
    pub dropoff_longitude: Option<f64>,
    pub dropoff_latitude: Option<f64>,

    /// Store-and-forward flag ("Y"/"N")
    pub store_and_fwd_flag: Option<String>,

    /// Trip duration in seconds
    pub trip_duration: Option<i64>,
}

impl RawTripRecord {
    /// Names of required fields that are absent or blank on this record
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        if self.id.as_deref().is_none_or(|v| v.trim().is_empty()) {
            missing.push("id");
        }
        if self.vendor_id.is_none() {
            missing.push("vendor_id");
        }
        if self
            .pickup_datetime
            .as_deref()
            .is_none_or(|v| v.trim().is_empty())
        {
            missing.push("pickup_datetime");
        }
        if self
            .dropoff_datetime
            .as_deref()
            .is_none_or(|v| v.trim().is_empty())
        {
            missing.push("dropoff_datetime");
        }
        if self.passenger_count.is_none() {
            missing.push("passenger_count");
        }
        if self.pickup_longitude.is_none() {
            missing.push("pickup_longitude");
        }
        if self.pickup_latitude.is_none() {
            missing.push("pickup_latitude");
        }
        if self.dropoff_longitude.is_none() {
            missing.push("dropoff_longitude");
        }
        if self.dropoff_latitude.is_none() {
            missing.push("dropoff_latitude");
        }
        if self
            .store_and_fwd_flag
            .as_deref()
            .is_none_or(|v| v.trim().is_empty())
        {
            missing.push("store_and_fwd_flag");
        }
        if self.trip_duration.is_none() {
            missing.push("trip_duration");
        }

        missing
    }

    /// Check whether all required fields are present
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

// =============================================================================
// Validated Trip Record
// =============================================================================

/// A trip record after timestamp validation, with fully typed fields
///
/// Produced by the timestamp stage; carries the temporal features extracted
/// from the pickup timestamp. Weekday numbering is Monday = 0 through
/// Sunday = 6.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidTripRecord {
    pub id: String,
    pub vendor_id: i64,
    pub pickup_datetime: NaiveDateTime,
    pub dropoff_datetime: NaiveDateTime,
    pub passenger_count: i64,
    pub pickup_longitude: f64,
    pub pickup_latitude: f64,
    pub dropoff_longitude: f64,
    pub dropoff_latitude: f64,
    pub store_and_fwd_flag: String,
    pub trip_duration: i64,

    // Temporal features derived from the pickup timestamp
    pub pickup_hour: u32,
    pub pickup_day: u32,
    pub pickup_month: u32,
    pub pickup_weekday: u32,
    pub pickup_year: i32,
}

// =============================================================================
// Cleaned Trip Record
// =============================================================================

/// A fully cleaned trip record with all derived features
///
/// Invariant: every [`CleanedTripRecord`] has passed all validation stages
/// simultaneously. This is the sole artifact consumed by warehouse loading.
/// Field order defines the cleaned CSV column order (source columns first,
/// derived columns appended).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedTripRecord {
    pub id: String,
    pub vendor_id: i64,
    #[serde(with = "trip_datetime")]
    pub pickup_datetime: NaiveDateTime,
    #[serde(with = "trip_datetime")]
    pub dropoff_datetime: NaiveDateTime,
    pub passenger_count: i64,
    pub pickup_longitude: f64,
    pub pickup_latitude: f64,
    pub dropoff_longitude: f64,
    pub dropoff_latitude: f64,
    pub store_and_fwd_flag: String,
    pub trip_duration: i64,

    pub pickup_hour: u32,
    pub pickup_day: u32,
    pub pickup_month: u32,
    pub pickup_weekday: u32,
    pub pickup_year: i32,

    pub trip_distance_km: f64,
    pub trip_speed_kmh: f64,
    pub trip_efficiency: f64,
    pub time_of_day: TimeOfDay,
    #[serde(with = "bool_as_int")]
    pub is_weekend: bool,
}

impl CleanedTripRecord {
    /// Normalized pickup timestamp string, the time-dimension natural key
    pub fn pickup_key(&self) -> String {
        self.pickup_datetime
            .format(TRIP_DATETIME_FORMAT)
            .to_string()
    }

    /// Canonical pickup coordinate key (micro-degrees)
    pub fn pickup_coordinate_key(&self) -> (i64, i64) {
        constants::coordinate_key(self.pickup_latitude, self.pickup_longitude)
    }

    /// Canonical dropoff coordinate key (micro-degrees)
    pub fn dropoff_coordinate_key(&self) -> (i64, i64) {
        constants::coordinate_key(self.dropoff_latitude, self.dropoff_longitude)
    }

    /// Validate the cleaned-record invariants
    ///
    /// All validation stages enforce these during cleaning; this method exists
    /// for defense when records are read back from a cleaned artifact.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::data_validation(
                "Cleaned record has empty id".to_string(),
            ));
        }

        if self.dropoff_datetime <= self.pickup_datetime {
            return Err(Error::data_validation(format!(
                "Record {}: dropoff {} is not after pickup {}",
                self.id, self.dropoff_datetime, self.pickup_datetime
            )));
        }

        if self.trip_duration <= constants::MIN_TRIP_DURATION_SECS
            || self.trip_duration > constants::MAX_TRIP_DURATION_SECS
        {
            return Err(Error::data_validation(format!(
                "Record {}: duration {}s outside valid range",
                self.id, self.trip_duration
            )));
        }

        if !constants::within_bounding_box(self.pickup_latitude, self.pickup_longitude)
            || !constants::within_bounding_box(self.dropoff_latitude, self.dropoff_longitude)
        {
            return Err(Error::data_validation(format!(
                "Record {}: coordinates outside service area",
                self.id
            )));
        }

        if !(constants::MIN_PASSENGER_COUNT..=constants::MAX_PASSENGER_COUNT)
            .contains(&self.passenger_count)
        {
            return Err(Error::data_validation(format!(
                "Record {}: passenger count {} outside valid range",
                self.id, self.passenger_count
            )));
        }

        if !(constants::MIN_TRIP_SPEED_KMH..=constants::MAX_TRIP_SPEED_KMH)
            .contains(&self.trip_speed_kmh)
        {
            return Err(Error::data_validation(format!(
                "Record {}: speed {:.2} km/h outside valid range",
                self.id, self.trip_speed_kmh
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Time-of-Day Enumeration
// =============================================================================

/// Bucketed time-of-day category derived from the pickup hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    /// Pickup hour in [6, 12)
    Morning,
    /// Pickup hour in [12, 18)
    Afternoon,
    /// Pickup hour in [18, 22)
    Evening,
    /// All remaining hours
    Night,
}

impl TimeOfDay {
    /// Stable lowercase name used in artifacts and the warehouse
    pub fn as_str(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "morning" => Ok(TimeOfDay::Morning),
            "afternoon" => Ok(TimeOfDay::Afternoon),
            "evening" => Ok(TimeOfDay::Evening),
            "night" => Ok(TimeOfDay::Night),
            other => Err(Error::data_validation(format!(
                "Invalid time-of-day value '{}': must be morning, afternoon, evening, or night",
                other
            ))),
        }
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Location Type Enumeration
// =============================================================================

/// Role classification of a location dimension row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    /// Observed only as a pickup coordinate
    Pickup,
    /// Observed only as a dropoff coordinate
    Dropoff,
    /// Observed in both roles
    Both,
}

impl LocationType {
    /// Stable lowercase name stored in the warehouse
    pub fn as_str(self) -> &'static str {
        match self {
            LocationType::Pickup => "pickup",
            LocationType::Dropoff => "dropoff",
            LocationType::Both => "both",
        }
    }
}

impl FromStr for LocationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "pickup" => Ok(LocationType::Pickup),
            "dropoff" => Ok(LocationType::Dropoff),
            "both" => Ok(LocationType::Both),
            other => Err(Error::data_validation(format!(
                "Invalid location type '{}': must be pickup, dropoff, or both",
                other
            ))),
        }
    }
}

impl std::fmt::Display for LocationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Serde Helpers
// =============================================================================

/// Serialize trip timestamps in the source format (`%Y-%m-%d %H:%M:%S`)
mod trip_datetime {
    use super::TRIP_DATETIME_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(TRIP_DATETIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TRIP_DATETIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Serialize booleans as 0/1, matching the tabular artifact format
mod bool_as_int {
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = u8::deserialize(deserializer)?;
        Ok(raw != 0)
    }
}
