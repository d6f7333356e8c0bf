//! jobscout CLI: positional job-posting collection and cloud-skill tagging.
//!
//! Enumerates posting identifiers from a listing, fetches each posting,
//! extracts a structured record and exports the results as CSV.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
