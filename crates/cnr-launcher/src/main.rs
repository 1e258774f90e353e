//! CNR Launcher
//!
//! Headless front for the game library: one JSON request per stdin line, one
//! JSON response per stdout line. Logs go to stderr.

use anyhow::Result;
use clap::Parser;
use cnr_config::LauncherConfig;
use cnr_launcher::{ProcessRelauncher, SystemSpawner, build_dispatcher, serve};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "cnr-launcher", version, about = "CNR game launcher request server")]
struct Cli {
    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding the record store and uploads
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Tracing filter, e.g. `debug` or `cnr_storage=trace`
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,

    /// Write the effective configuration to FILE and exit
    #[arg(long, value_name = "FILE")]
    save_config: Option<PathBuf>,
}

fn init_logging(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = LauncherConfig::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level;
    }

    init_logging(&config.log_level);

    if let Some(path) = cli.save_config {
        config.save(&path)?;
        return Ok(());
    }

    info!("CNR Launcher starting, data dir {}", config.data_dir.display());

    let dispatcher = build_dispatcher(
        &config,
        Box::new(SystemSpawner),
        Box::new(ProcessRelauncher),
    )
    .await?;

    serve(
        &dispatcher,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await?;

    info!("CNR Launcher exiting");
    Ok(())
}
