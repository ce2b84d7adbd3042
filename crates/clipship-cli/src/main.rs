//! ClipShip CLI - batch data extraction
//!
//! Clips the requested layers to an area of interest, converts them to the
//! requested formats through the engine adapter, and ships the results as
//! a zip archive with an HTML processing log.

mod aoi;
mod cli;
mod run;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

fn main() -> Result<()> {
    // Initialize tracing (the operator-facing channel)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    run::execute(cli)
}
