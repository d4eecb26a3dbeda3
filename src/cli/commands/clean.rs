//! Clean command implementation
//!
//! Runs the full validation pipeline over a raw trip file and persists the
//! cleaned data, the structured quality log, and the summary report.

use colored::Colorize;
use std::time::Instant;
use tracing::{debug, info};

use super::shared::{format_percentage, setup_logging};
use crate::app::services::cleaning::{TripCleaner, write_artifacts};
use crate::app::services::trip_reader;
use crate::cli::args::CleanArgs;
use crate::config::Config;
use crate::Result;

/// Run the cleaning pipeline over a raw trip file
pub fn run_clean(args: CleanArgs) -> Result<()> {
    let start_time = Instant::now();

    setup_logging(args.get_log_level(), args.quiet)?;

    info!("Starting trip cleaning");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;

    let mut config = Config::default();
    config.processing.output_dir = args.output_dir.clone();
    config.validate()?;

    let records = trip_reader::read_raw_trips(&args.input_path)?;
    let total = records.len();

    let cleaner = TripCleaner::new(config.quality);
    let result = cleaner.clean(records, args.show_progress());

    let artifacts = write_artifacts(
        &config.processing.output_dir,
        &args.input_path,
        &result.records,
        &result.log,
    )?;

    if !args.quiet {
        let kept = result.record_count();
        println!();
        println!("{}", "Cleaning complete".green().bold());
        println!(
            "  {} of {} records kept ({})",
            kept,
            total,
            format_percentage(kept, total)
        );
        for (category, count) in &result.log.removed_records {
            if *count > 0 {
                println!("  {} removed: {}", category, count);
            }
        }
        println!(
            "  Cleaned data: {}",
            artifacts.cleaned_data_path.display()
        );
        println!("  Quality log:  {}", artifacts.log_path.display());
        println!("  Report:       {}", artifacts.report_path.display());
        println!(
            "  Finished in {:.2}s",
            start_time.elapsed().as_secs_f64()
        );
    }

    info!(
        "Cleaning finished in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}
