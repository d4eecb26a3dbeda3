//! Command-line argument definitions for the trip warehouse
//!
//! This module defines the complete CLI interface using the clap derive API.

use crate::constants::DEFAULT_BATCH_SIZE;
use crate::{Error, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the trip warehouse pipeline
///
/// Cleans raw trip records and loads them into a dimensional warehouse with
/// conformed time and location dimensions plus a trip fact table.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "trip-warehouse",
    version,
    about = "Clean city trip records and load them into a dimensional warehouse",
    long_about = "A batch pipeline that validates raw trip records through a multi-stage \
                  cleaning pass with full removal accounting, then loads the cleaned set \
                  into a dimensional warehouse with idempotent, transactional batch inserts. \
                  Every run produces a machine-readable quality log and a human-readable \
                  summary."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands for the trip warehouse
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Run the cleaning pipeline and write cleaned data plus quality artifacts
    Clean(CleanArgs),
    /// Resolve dimensions and load cleaned records into the warehouse
    Load(LoadArgs),
    /// Run read-only integrity checks against a loaded warehouse
    Verify(VerifyArgs),
}

/// Arguments for the clean command
#[derive(Debug, Clone, Parser)]
pub struct CleanArgs {
    /// Raw trip CSV file to clean
    #[arg(
        short = 'i',
        long = "input",
        value_name = "FILE",
        help = "Raw trip CSV file to clean"
    )]
    pub input_path: PathBuf,

    /// Output directory for cleaned data and log artifacts
    ///
    /// Created if it doesn't exist. Receives cleaned_trips.csv plus a logs/
    /// subdirectory with the quality log and summary report.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        default_value = "data",
        help = "Output directory for cleaned data and logs"
    )]
    pub output_dir: PathBuf,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the load command
#[derive(Debug, Clone, Parser)]
pub struct LoadArgs {
    /// Cleaned trip CSV file produced by the clean command
    #[arg(
        short = 'c',
        long = "csv",
        value_name = "FILE",
        help = "Cleaned trip CSV file to load"
    )]
    pub csv_path: PathBuf,

    /// Warehouse database file
    ///
    /// Created if it doesn't exist; an existing warehouse is loaded
    /// idempotently.
    #[arg(
        short = 'w',
        long = "warehouse",
        value_name = "FILE",
        default_value = "warehouse.db",
        help = "Warehouse database file"
    )]
    pub warehouse_path: PathBuf,

    /// Number of fact rows per batch transaction
    #[arg(
        short = 'b',
        long = "batch-size",
        value_name = "COUNT",
        default_value_t = DEFAULT_BATCH_SIZE,
        help = "Number of fact rows per batch transaction"
    )]
    pub batch_size: usize,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the verify command
#[derive(Debug, Clone, Parser)]
pub struct VerifyArgs {
    /// Warehouse database file to verify
    #[arg(
        short = 'w',
        long = "warehouse",
        value_name = "FILE",
        default_value = "warehouse.db",
        help = "Warehouse database file to verify"
    )]
    pub warehouse_path: PathBuf,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,
}

impl Args {
    /// Get the command if one was specified
    pub fn get_command(&self) -> Commands {
        self.command
            .clone()
            .expect("Command should be present when get_command() is called")
    }
}

impl CleanArgs {
    /// Validate the clean command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if !self.input_path.exists() {
            return Err(Error::configuration(format!(
                "Input file does not exist: {}",
                self.input_path.display()
            )));
        }

        if self.input_path.is_dir() {
            return Err(Error::configuration(format!(
                "Input path is a directory, expected a file: {}",
                self.input_path.display()
            )));
        }

        Ok(())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, self.quiet)
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl LoadArgs {
    /// Validate the load command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if !self.csv_path.exists() {
            return Err(Error::configuration(format!(
                "Cleaned file does not exist: {}",
                self.csv_path.display()
            )));
        }

        if self.batch_size == 0 {
            return Err(Error::configuration(
                "Batch size must be greater than 0".to_string(),
            ));
        }

        if let Some(parent) = self.warehouse_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(Error::configuration(format!(
                    "Warehouse directory does not exist: {}",
                    parent.display()
                )));
            }
        }

        Ok(())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, self.quiet)
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

impl VerifyArgs {
    /// Validate the verify command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if !self.warehouse_path.exists() {
            return Err(Error::configuration(format!(
                "Warehouse does not exist: {}",
                self.warehouse_path.display()
            )));
        }

        Ok(())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        log_level(self.verbose, false)
    }
}

fn log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
