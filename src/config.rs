//! Configuration management and validation.
//!
//! Provides configuration structures for processing paths, batch sizing, and
//! the validation rules applied by the cleaning pipeline. Configuration is
//! assembled from CLI arguments and defaults; the thresholds are exposed here
//! so the pipeline stages stay free of hard-coded values.

use crate::constants::{
    DEFAULT_BATCH_SIZE, IQR_OUTLIER_MULTIPLIER, MAX_LATITUDE, MAX_LONGITUDE,
    MAX_PASSENGER_COUNT, MAX_TRIP_DURATION_SECS, MAX_TRIP_SPEED_KMH, MIN_LATITUDE, MIN_LONGITUDE,
    MIN_PASSENGER_COUNT, MIN_TRIP_DURATION_SECS, MIN_TRIP_SPEED_KMH,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete configuration for a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Paths and batch sizing
    pub processing: ProcessingConfig,
    /// Validation thresholds applied by the cleaning stages
    pub quality: QualityRulesConfig,
}

/// Processing paths and batch sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Directory receiving cleaned data and log artifacts
    pub output_dir: PathBuf,

    /// Warehouse database file
    pub warehouse_path: PathBuf,

    /// Number of fact rows per batch transaction
    pub batch_size: usize,
}

/// Validation thresholds for the cleaning pipeline
///
/// Defaults mirror the service-area rules in [`crate::constants`]; tests
/// override individual bounds to exercise stage behavior in isolation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityRulesConfig {
    /// Bounding box accepted by the geospatial stage
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,

    /// Absolute duration bounds in seconds (exclusive low, inclusive high)
    pub min_duration_secs: i64,
    pub max_duration_secs: i64,

    /// Multiplier for the interquartile-range outlier bounds
    pub iqr_multiplier: f64,

    /// Inclusive passenger count bounds
    pub min_passengers: i64,
    pub max_passengers: i64,

    /// Inclusive speed bounds in km/h
    pub min_speed_kmh: f64,
    pub max_speed_kmh: f64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("data"),
            warehouse_path: PathBuf::from(crate::constants::DEFAULT_WAREHOUSE_FILENAME),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Default for QualityRulesConfig {
    fn default() -> Self {
        Self {
            min_latitude: MIN_LATITUDE,
            max_latitude: MAX_LATITUDE,
            min_longitude: MIN_LONGITUDE,
            max_longitude: MAX_LONGITUDE,
            min_duration_secs: MIN_TRIP_DURATION_SECS,
            max_duration_secs: MAX_TRIP_DURATION_SECS,
            iqr_multiplier: IQR_OUTLIER_MULTIPLIER,
            min_passengers: MIN_PASSENGER_COUNT,
            max_passengers: MAX_PASSENGER_COUNT,
            min_speed_kmh: MIN_TRIP_SPEED_KMH,
            max_speed_kmh: MAX_TRIP_SPEED_KMH,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            processing: ProcessingConfig::default(),
            quality: QualityRulesConfig::default(),
        }
    }
}

impl QualityRulesConfig {
    /// Validate threshold consistency
    pub fn validate(&self) -> Result<()> {
        if self.min_latitude >= self.max_latitude {
            return Err(Error::configuration(format!(
                "min_latitude {} must be below max_latitude {}",
                self.min_latitude, self.max_latitude
            )));
        }

        if self.min_longitude >= self.max_longitude {
            return Err(Error::configuration(format!(
                "min_longitude {} must be below max_longitude {}",
                self.min_longitude, self.max_longitude
            )));
        }

        if self.min_duration_secs >= self.max_duration_secs {
            return Err(Error::configuration(format!(
                "min_duration_secs {} must be below max_duration_secs {}",
                self.min_duration_secs, self.max_duration_secs
            )));
        }

        if self.iqr_multiplier <= 0.0 {
            return Err(Error::configuration(
                "iqr_multiplier must be positive".to_string(),
            ));
        }

        if self.min_passengers > self.max_passengers {
            return Err(Error::configuration(format!(
                "min_passengers {} must not exceed max_passengers {}",
                self.min_passengers, self.max_passengers
            )));
        }

        if self.min_speed_kmh >= self.max_speed_kmh {
            return Err(Error::configuration(format!(
                "min_speed_kmh {} must be below max_speed_kmh {}",
                self.min_speed_kmh, self.max_speed_kmh
            )));
        }

        Ok(())
    }
}

impl Config {
    /// Validate the full configuration
    pub fn validate(&self) -> Result<()> {
        if self.processing.batch_size == 0 {
            return Err(Error::configuration(
                "Batch size must be greater than 0".to_string(),
            ));
        }

        self.quality.validate()
    }
}
