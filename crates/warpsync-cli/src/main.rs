mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Args, Command};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warpsync=info".parse()?))
        .init();

    let args = Args::parse();
    let mut config = config::load(args.config.as_deref())?;

    match args.command {
        Command::Sync {
            api,
            interval_ms,
            page_size,
        } => {
            if let Some(ms) = interval_ms {
                config.request_interval_ms = ms;
            }
            if let Some(size) = page_size {
                config.page_size = size;
            }
            commands::sync::run(&config, api.as_deref())
        }
        Command::Import { file } => commands::import::run(&config, &file),
        Command::Stats { uid, json } => commands::stats::run(&config, &uid, json),
    }
}
