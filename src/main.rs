//! imgplex - image variant builder.

use anyhow::Result;
use clap::{ColorChoice, Parser};
use imgplex::cli::{self, Cli, Commands};
use imgplex::config::PlexConfig;
use imgplex::logger;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    match &cli.command {
        Commands::Build { args } => {
            logger::set_verbose(args.verbose);
            let config = PlexConfig::load(&cli.config, &args.overrides())?;
            cli::build::run(&config, &args.files).await.map(|_| ())
        }
        Commands::Plan { args } => {
            let config = PlexConfig::load(&cli.config, &args.overrides())?;
            cli::plan::run(&config, &args.files, args.pretty).await
        }
    }
}
