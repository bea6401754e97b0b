use anyhow::{Context, Result};
use clap::Parser;
use student_cli::cli::Cli;
use student_cli::{commands, logging, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.overrides()).context("failed to load configuration")?;

    // keep the file writer alive until exit
    let _guard = logging::init(cli.verbose, config.log_dir.as_deref());
    tracing::debug!(base_url = %config.base_url, page_size = config.page_size, "configuration loaded");

    commands::run(cli.command, &config).await
}
