//! Reze CLI - headless probe for the playback display engine
//!
//! Features:
//! - Quality ladder probing (what the quality menu would offer)
//! - Resolution to quality label mapping
//! - Display configuration validation

use clap::{Parser, Subcommand};
use reze_core::SourceQuality;
use std::path::PathBuf;

mod commands;
mod output;

/// Reze CLI - playback display toolkit
#[derive(Parser)]
#[command(name = "reze")]
#[command(author = "Reze Player Contributors")]
#[command(version)]
#[command(about = "Probe streams the way the Reze display engine sees them", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json, table)
    #[arg(short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch an HLS master playlist and show its quality ladder
    Probe {
        /// URL of the master playlist
        url: String,

        /// Extra request header as `name:value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Show which level a manual pin to this quality would select
        #[arg(short, long)]
        quality: Option<SourceQuality>,
    },

    /// Map video heights to quality labels
    Quality {
        /// Heights in pixels
        #[arg(required = true)]
        heights: Vec<u32>,
    },

    /// Validate and print a display configuration
    Config {
        /// JSON config file (defaults when omitted)
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .init();

    reze_core::init();

    match cli.command {
        Commands::Probe { url, headers, quality } => {
            commands::probe(&url, &headers, quality, &cli.format).await?;
        }
        Commands::Quality { heights } => {
            commands::quality(&heights, &cli.format)?;
        }
        Commands::Config { file } => {
            commands::config(file, &cli.format)?;
        }
    }

    Ok(())
}
