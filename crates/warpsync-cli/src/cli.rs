use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "warpsync")]
#[command(version)]
#[command(about = "Honkai: Star Rail warp history sync")]
pub struct Args {
    /// Config file (defaults to <config dir>/warpsync/config.toml)
    #[arg(short, long, global = true, env = "WARPSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Download new warp records and merge them into the local store
    Sync {
        /// Gacha log URL (defaults to the configured game web cache)
        #[arg(long)]
        api: Option<String>,

        /// Delay after each request in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Records requested per page
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Import an SRGF JSON export
    Import {
        /// SRGF file to import
        file: PathBuf,
    },
    /// Show statistics of a stored player
    Stats {
        /// Player uid
        uid: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}
