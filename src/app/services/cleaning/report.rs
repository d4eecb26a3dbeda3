//! Cleaning artifact persistence
//!
//! Writes the three artifacts of one pipeline run: the cleaned record set as
//! CSV, the quality log as structured JSON, and a plain-text summary report.
//! Writing is all-or-nothing from the caller's perspective: any failed write
//! fails the run and no partial log should be treated as authoritative.

use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::log::CleaningLog;
use crate::app::models::CleanedTripRecord;
use crate::constants::{
    CLEANED_DATA_FILENAME, CLEANING_LOG_FILENAME, CLEANING_REPORT_FILENAME, LOGS_DIR_NAME,
    TRIP_DATETIME_FORMAT,
};
use crate::{Error, Result};

/// Paths of the artifacts produced by one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct CleaningArtifacts {
    pub cleaned_data_path: PathBuf,
    pub log_path: PathBuf,
    pub report_path: PathBuf,
}

/// Persist the cleaned record set, quality log, and summary report
///
/// Creates `output_dir` and its `logs` subdirectory as needed. `input_path`
/// only labels the report header.
pub fn write_artifacts(
    output_dir: &Path,
    input_path: &Path,
    records: &[CleanedTripRecord],
    log: &CleaningLog,
) -> Result<CleaningArtifacts> {
    let logs_dir = output_dir.join(LOGS_DIR_NAME);
    fs::create_dir_all(&logs_dir)
        .map_err(|e| Error::io(format!("Failed to create {}", logs_dir.display()), e))?;

    let cleaned_data_path = output_dir.join(CLEANED_DATA_FILENAME);
    write_cleaned_csv(&cleaned_data_path, records)?;
    info!(
        "Saved {} cleaned records to {}",
        records.len(),
        cleaned_data_path.display()
    );

    let log_path = logs_dir.join(CLEANING_LOG_FILENAME);
    let json = serde_json::to_string_pretty(log).map_err(|e| {
        Error::report_writing(
            log_path.display().to_string(),
            format!("Failed to serialize cleaning log: {}", e),
        )
    })?;
    fs::write(&log_path, json)
        .map_err(|e| Error::io(format!("Failed to write {}", log_path.display()), e))?;
    info!("Saved cleaning log to {}", log_path.display());

    let report_path = logs_dir.join(CLEANING_REPORT_FILENAME);
    let report = render_report(input_path, log);
    fs::write(&report_path, report)
        .map_err(|e| Error::io(format!("Failed to write {}", report_path.display()), e))?;
    info!("Saved summary report to {}", report_path.display());

    Ok(CleaningArtifacts {
        cleaned_data_path,
        log_path,
        report_path,
    })
}

fn write_cleaned_csv(path: &Path, records: &[CleanedTripRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| Error::csv_parsing(path.display().to_string(), "Failed to open cleaned output", Some(e)))?;

    for record in records {
        writer.serialize(record).map_err(|e| {
            Error::csv_parsing(
                path.display().to_string(),
                format!("Failed to write record {}", record.id),
                Some(e),
            )
        })?;
    }

    writer
        .flush()
        .map_err(|e| Error::io(format!("Failed to flush {}", path.display()), e))?;

    Ok(())
}

/// Render the plain-text summary report
///
/// Categories appear in the same order they were recorded by the pipeline.
pub fn render_report(input_path: &Path, log: &CleaningLog) -> String {
    let divider = "=".repeat(60);
    let rule = "-".repeat(60);
    let mut out = String::new();

    out.push_str(&format!("{}\n", divider));
    out.push_str("TRIP DATA CLEANING REPORT\n");
    out.push_str(&format!("{}\n\n", divider));
    out.push_str(&format!("Input file: {}\n", input_path.display()));
    out.push_str(&format!(
        "Processing date: {}\n\n",
        Local::now().format(TRIP_DATETIME_FORMAT)
    ));

    out.push_str("CLEANING SUMMARY\n");
    out.push_str(&format!("{}\n", rule));
    out.push_str(&format!(
        "Total records processed: {}\n",
        log.total_records
    ));

    if let Some(stats) = &log.statistics {
        out.push_str(&format!("Final records: {}\n", stats.final_record_count));
        out.push_str(&format!("Records removed: {}\n", stats.records_removed));
        out.push_str(&format!(
            "Removal percentage: {}%\n\n",
            stats.removal_percentage
        ));
    } else {
        out.push_str(&format!(
            "Records removed: {}\n\n",
            log.removed_total()
        ));
    }

    out.push_str("RECORDS REMOVED BY CATEGORY\n");
    out.push_str(&format!("{}\n", rule));
    for (category, count) in &log.removed_records {
        out.push_str(&format!("{}: {}\n", category, count));
    }

    out.push_str(&format!("\n{}\n", divider));
    out
}
