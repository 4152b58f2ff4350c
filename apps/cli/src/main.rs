//! docreport CLI — documentation-site report scraper.
//!
//! Scrapes release notes, version statuses, the PDF archive, and the
//! proposal status registry into console tables or delimited files.

mod commands;
mod output;

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
