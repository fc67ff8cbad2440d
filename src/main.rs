//! stockcast - Main Entry Point

use clap::Parser;
use stockcast::cli::{self, Cli};
use stockcast::config::PipelineConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = PipelineConfig::load(&cli.config)?;
    stockcast::init_tracing(&config.logging)?;

    cli::run(cli, config)?;

    Ok(())
}
