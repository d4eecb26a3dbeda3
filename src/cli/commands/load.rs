//! Load command implementation
//!
//! Reads a cleaned trip artifact, populates the time and location dimensions,
//! and loads the fact table in idempotent batch transactions. Dimension
//! population must fully succeed before any fact batch runs; a run that
//! processes records but inserts none is an error.

use colored::Colorize;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::shared::setup_logging;
use crate::app::models::audit::LoadStatus;
use crate::app::services::trip_reader;
use crate::app::services::warehouse::{
    Warehouse, build_dimension_maps, load_trip_facts, populate_dimensions,
};
use crate::cli::args::LoadArgs;
use crate::config::Config;
use crate::{Error, Result};

/// Run the warehouse load for a cleaned trip file
pub fn run_load(args: LoadArgs, cancel: CancellationToken) -> Result<()> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level(), args.quiet)?;

    info!("Starting warehouse load");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;

    let mut config = Config::default();
    config.processing.warehouse_path = args.warehouse_path.clone();
    config.processing.batch_size = args.batch_size;
    config.validate()?;

    let records = trip_reader::read_cleaned_trips(&args.csv_path)?;

    let mut warehouse = Warehouse::open(&config.processing.warehouse_path)?;

    // Dimensions first; a failed populate rolls back and aborts the load so
    // fact batches never run against partial lookup maps.
    let dimension_stats = populate_dimensions(&mut warehouse, &records)?;
    let maps = build_dimension_maps(&warehouse)?;

    let outcome = load_trip_facts(
        &mut warehouse,
        &records,
        &maps,
        config.processing.batch_size,
        args.show_progress(),
        &cancel,
    )?;

    if !args.quiet {
        println!();
        match outcome.status() {
            LoadStatus::Success => println!("{}", "Load complete".green().bold()),
            LoadStatus::Partial => println!("{}", "Load complete with rejections".yellow().bold()),
            LoadStatus::Failure => println!("{}", "Load failed".red().bold()),
        }
        println!(
            "  Dimensions: {} time entries, {} location entries",
            dimension_stats.time_entries, dimension_stats.location_entries
        );
        println!(
            "  Facts: {} processed, {} inserted ({} new), {} rejected",
            outcome.total_processed,
            outcome.records_inserted,
            outcome.new_rows,
            outcome.records_rejected
        );
        println!(
            "  Finished in {:.2}s",
            start_time.elapsed().as_secs_f64()
        );
    }

    info!(
        "Warehouse load finished in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    // Processing records without inserting any means every dimension lookup
    // failed; surface it as a run failure rather than a quiet PARTIAL.
    if outcome.status() == LoadStatus::Failure {
        return Err(Error::fact_loading(format!(
            "No records inserted out of {} processed",
            outcome.total_processed
        )));
    }

    Ok(())
}
