//! codepick command line binary.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;

use crate::cli::{Cli, Command};
use crate::commands::{load_store, run_import, run_search, run_select, run_stats};

const DEFAULT_DATA_PATH: &str = "data";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Get data path from flag, then env, then default
    let data_path = cli.data.clone().unwrap_or_else(|| {
        std::env::var("CODEPICK_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_PATH))
    });

    let store = load_store(&data_path)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Command::Search(args) => run_search(store, args, &mut out)?,
        Command::Select(args) => run_select(store, args, &mut out)?,
        Command::Import(args) => run_import(store, args, &mut out)?,
        Command::Stats => run_stats(&store, &mut out)?,
    }

    out.flush()?;
    Ok(())
}
