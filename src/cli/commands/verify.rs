//! Verify command implementation
//!
//! Runs the read-only integrity checks against a loaded warehouse and prints
//! the aggregate report plus the recent data-quality log entries. A sanity
//! check, not a correctness gate: nothing is mutated or rolled back.

use colored::Colorize;
use tracing::{debug, info};

use super::shared::setup_logging;
use crate::app::services::warehouse::{Warehouse, audit, run_integrity_checks};
use crate::cli::args::VerifyArgs;
use crate::Result;

/// Number of recent quality-log entries shown by the report
const QUALITY_LOG_DISPLAY_LIMIT: usize = 5;

/// Run the integrity checks against a warehouse
pub fn run_verify(args: VerifyArgs) -> Result<()> {
    setup_logging(args.get_log_level(), false)?;

    info!("Starting integrity verification");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;

    let warehouse = Warehouse::open(&args.warehouse_path)?;
    let report = run_integrity_checks(&warehouse)?;
    let quality_log = audit::read_quality_log(&warehouse)?;

    println!("{}", "Warehouse integrity report".bold());
    for line in report.lines() {
        println!("  {}", line);
    }

    if quality_log.is_empty() {
        println!("\n  No load runs recorded yet");
    } else {
        println!("\n{}", "Recent load runs".bold());
        for entry in quality_log.iter().rev().take(QUALITY_LOG_DISPLAY_LIMIT) {
            let status = match entry.load_status {
                crate::app::models::audit::LoadStatus::Success => {
                    entry.load_status.as_str().green()
                }
                crate::app::models::audit::LoadStatus::Partial => {
                    entry.load_status.as_str().yellow()
                }
                crate::app::models::audit::LoadStatus::Failure => entry.load_status.as_str().red(),
            };
            println!(
                "  {} {} - {} processed, {} inserted, {} rejected",
                entry.created_at,
                status,
                entry.total_records_processed,
                entry.records_inserted,
                entry.records_rejected
            );
        }
    }

    info!("Integrity verification complete");

    Ok(())
}
