use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use touchshell::cli::Cli;
use touchshell::config::{self, FileConfig, Settings};
use touchshell::{app, logging};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let file = match &cli.config {
        Some(path) => config::load(path).context("loading configuration")?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(&cli, file).context("invalid configuration")?;
    logging::init(&settings.log_filter, &settings.log_target)?;

    info!(
        device = %settings.device_name,
        width = settings.ui.width,
        height = settings.ui.height,
        rotation = settings.ui.rotation.degrees(),
        headless = settings.headless,
        "starting touchshell"
    );
    app::run(settings)
}
