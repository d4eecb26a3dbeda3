use clap::Parser;
use std::process;
use tokio_util::sync::CancellationToken;
use trip_warehouse::cli::{args::Args, commands};

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    // Create async runtime and run the main command logic with signal handling
    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        // Create cancellation token for coordinating graceful shutdown
        let cancellation_token = CancellationToken::new();

        // Set up graceful shutdown handling
        let shutdown_signal = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install CTRL+C signal handler");

            // Cancel all operations when Ctrl+C is received
            cancellation_token.cancel();
        };

        // Run the main command with cancellation support
        tokio::select! {
            result = commands::run(args, cancellation_token.clone()) => {
                result
            }
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, shutting down gracefully...");
                Err(trip_warehouse::Error::processing_interrupted(
                    "Processing interrupted by user".to_string()
                ))
            }
        }
    });

    match result {
        Ok(()) => {
            // Success - summaries have already been reported by the command
            process::exit(0);
        }
        Err(error) => {
            // Error occurred - print to stderr and exit with error code
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Trip Warehouse - Trip Record Cleaning and Dimensional Loading");
    println!("=============================================================");
    println!();
    println!("Clean raw city trip records through a staged validation pipeline and");
    println!("load them into a dimensional warehouse for downstream analytics.");
    println!();
    println!("USAGE:");
    println!("    trip-warehouse <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    clean      Validate raw trips and write cleaned data plus quality logs");
    println!("    load       Resolve dimensions and load facts into the warehouse");
    println!("    verify     Run read-only integrity checks against the warehouse");
    println!("    help       Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Clean a raw trip file into ./data:");
    println!("    trip-warehouse clean --input train.csv --output data");
    println!();
    println!("    # Load the cleaned file into the warehouse:");
    println!("    trip-warehouse load --csv data/cleaned_trips.csv --warehouse warehouse.db");
    println!();
    println!("    # Check the loaded warehouse:");
    println!("    trip-warehouse verify --warehouse warehouse.db");
    println!();
    println!("For detailed help on any command, use:");
    println!("    trip-warehouse <COMMAND> --help");
}
