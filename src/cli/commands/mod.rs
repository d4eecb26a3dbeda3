//! Command implementations for the trip warehouse CLI
//!
//! This module contains the command execution logic and error handling for
//! the CLI interface. Each command is implemented in its own module:
//! - `clean`: validation pipeline with artifact output
//! - `load`: dimension resolution and fact loading
//! - `verify`: read-only warehouse integrity checks

pub mod clean;
pub mod load;
pub mod shared;
pub mod verify;

use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::cli::args::{Args, Commands};

/// Main command runner for the trip warehouse
///
/// Dispatches to the appropriate subcommand handler based on CLI args. The
/// cancellation token is honored by the load command between fact batches;
/// cleaning and verification are short-lived enough to run to completion.
pub async fn run(args: Args, cancel: CancellationToken) -> Result<()> {
    match args.get_command() {
        Commands::Clean(clean_args) => clean::run_clean(clean_args),
        Commands::Load(load_args) => load::run_load(load_args, cancel),
        Commands::Verify(verify_args) => verify::run_verify(verify_args),
    }
}
