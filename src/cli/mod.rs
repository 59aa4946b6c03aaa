//! Command line interface.

pub mod command;

use std::{net::SocketAddr, path::PathBuf};

use clap::{command, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rebuild the database from station files and the crop yield file
    Ingest {
        #[arg(long, default_value = "weather.db")]
        db: PathBuf,
        /// Directory of `<STATION>.txt` files
        #[arg(long, default_value = "wx_data")]
        weather_dir: PathBuf,
        #[arg(long, default_value = "yld_data/US_corn_grain_yield.txt")]
        yield_file: PathBuf,
    },
    /// Serve the query API
    Serve {
        #[arg(long, default_value = "weather.db")]
        db: PathBuf,
        #[arg(long, default_value = "127.0.0.1:5000")]
        bind: SocketAddr,
    },
}

/// Installs the tracing subscriber. `RUST_LOG` wins over `level`.
pub fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cropwx={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Creates a progress bar.
pub fn create_progress_bar(size: u64, message: String) -> ProgressBar {
    ProgressBar::new(size).with_message(message).with_style(
        ProgressStyle::with_template("[{eta_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    )
}
