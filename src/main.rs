mod aggregate;
mod api;
mod cli;
mod db;
mod deserialise;
mod error;
mod reading;

use anyhow::{Error, Result};
use clap::Parser;
use cli::{command, init_tracing, Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Ingest {
            db,
            weather_dir,
            yield_file,
        } => {
            let config = command::PipelineConfig {
                db_path: db,
                weather_dir,
                yield_file,
            };
            command::ingest(config).await?;
        }
        Commands::Serve { db, bind } => command::serve(&db, bind).await?,
    }

    Ok(())
}
