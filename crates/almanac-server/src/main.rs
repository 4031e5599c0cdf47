use std::path::PathBuf;

use almanac_core::config::Config;
use anyhow::Context;
use clap::{ArgAction, Parser};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "almanac-server", version, about = "REST backend for Almanac user events")]
struct ServerCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    quiet: u8,

    #[arg(long = "config")]
    config: Option<PathBuf>,
}

fn main() {
    if let Err(err) = run() {
        error!(error = %format!("{err:#}"), "server failed");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = ServerCli::parse();
    // Request logs are wanted by default, so start one level above the CLI.
    almanac_core::cli::init_tracing(cli.verbose.saturating_add(1), cli.quiet)?;

    let cfg = Config::load(cli.config.as_deref())?;
    info!(
        backend = ?cfg.storage.backend,
        port = cfg.server.port,
        "starting almanac server"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(almanac_server::serve(cfg))
}
