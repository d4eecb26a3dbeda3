//! Trip Warehouse Library
//!
//! A Rust library for cleaning city trip records and loading them into a
//! dimensional warehouse (conformed time and location dimensions plus a trip
//! fact table).
//!
//! This library provides tools for:
//! - Reading raw trip CSV files with tolerant per-record handling
//! - Running a multi-stage validation pipeline with full removal accounting
//! - Deriving geometric and temporal trip features (distance, speed, buckets)
//! - Writing cleaned data, a structured quality log, and a summary report
//! - Resolving natural keys into surrogate dimension keys at load time
//! - Idempotent, transactional batch loading of the trip fact table
//! - Post-load integrity auditing and append-only quality logging

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod cleaning;
        pub mod features;
        pub mod trip_reader;
        pub mod warehouse;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{CleanedTripRecord, RawTripRecord, TimeOfDay};
pub use config::Config;

/// Result type alias for the trip warehouse
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for trip processing and loading operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error
    #[error("CSV parsing error in file '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Input file does not match the expected trip record schema
    #[error("Input format error in file '{file}': {message}")]
    InputFormat { file: String, message: String },

    /// Date/time parsing error
    #[error("Date/time parsing error: {message}")]
    DateTimeParsing {
        message: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Data validation error
    #[error("Data validation error: {message}")]
    DataValidation { message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Warehouse access error
    #[error("Warehouse error: {message}")]
    Warehouse {
        message: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Dimension population failed and was rolled back
    #[error("Dimension resolution error: {message}")]
    DimensionResolution { message: String },

    /// Fact batch loading failed
    #[error("Fact loading error: {message}")]
    FactLoading { message: String },

    /// Report or artifact writing error
    #[error("Report writing error for '{path}': {message}")]
    ReportWriting { path: String, message: String },

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a CSV parsing error with context
    pub fn csv_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an input format error
    pub fn input_format(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InputFormat {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a date/time parsing error
    pub fn datetime_parsing(message: impl Into<String>, source: chrono::ParseError) -> Self {
        Self::DateTimeParsing {
            message: message.into(),
            source,
        }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a warehouse access error with context
    pub fn warehouse(message: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Warehouse {
            message: message.into(),
            source,
        }
    }

    /// Create a dimension resolution error
    pub fn dimension_resolution(message: impl Into<String>) -> Self {
        Self::DimensionResolution {
            message: message.into(),
        }
    }

    /// Create a fact loading error
    pub fn fact_loading(message: impl Into<String>) -> Self {
        Self::FactLoading {
            message: message.into(),
        }
    }

    /// Create a report writing error
    pub fn report_writing(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ReportWriting {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            file: "unknown".to_string(),
            message: "CSV parsing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<chrono::ParseError> for Error {
    fn from(error: chrono::ParseError) -> Self {
        Self::DateTimeParsing {
            message: "Date/time parsing failed".to_string(),
            source: error,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        Self::Warehouse {
            message: "Warehouse operation failed".to_string(),
            source: error,
        }
    }
}
