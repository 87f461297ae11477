//! Shotline CLI binary.
//!
//! This binary provides command-line access to an episode workspace:
//! - Merge a model reply into the stored shots
//! - List shots and their revision history
//! - Approve or restore individual shots

use clap::Parser;
use shotline::{LoggingConfig, ShotlineConfig, init_logging};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, handle_command};

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut logging = LoggingConfig::new().with_json_logs(cli.json_logs);
    if cli.verbose {
        logging = logging.with_log_level("debug");
    }
    init_logging(&logging)?;

    let config = match &cli.config {
        Some(path) => ShotlineConfig::from_file(path)?,
        None => ShotlineConfig::load()?,
    };

    handle_command(cli.command, &config).await?;

    Ok(())
}
