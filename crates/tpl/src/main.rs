mod app;
mod cli;
mod units;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::Cli;

fn setup_logging(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_level());

    let report = app::run(&cli)?;
    log::debug!(
        "{} templates rendered, {} skipped",
        report.rendered.len(),
        report.skipped.len()
    );
    Ok(())
}
