//! Bucket ladder calculator
//!
//! Offline command-line front-end for the ladder core:
//! - Bucket index <-> price lookups
//! - Bucket bands and ladder tables
//! - WAD multiply/divide/sqrt with the pool contracts' rounding

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::commands::Command;
use crate::config::{CliConfig, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "ladder", version, about = "Bucket ladder and WAD calculator")]
struct Cli {
    /// Print JSON instead of plain text
    #[arg(long, global = true)]
    json: bool,

    /// Profile name or TOML file, overrides LADDER_PROFILE
    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Use --profile or LADDER_PROFILE to select: default, json, verbose, or file path
    let mut config = match &cli.profile {
        Some(profile) => CliConfig::from_profile(profile)?,
        None => CliConfig::from_env()?,
    };
    if cli.json {
        config.output.format = OutputFormat::Json;
    }

    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)))
        .init();

    config.log_config();

    let report = commands::run(&cli.command, &config.table)?;

    match config.output.format {
        OutputFormat::Text => println!("{}", report.text),
        OutputFormat::Json if config.output.pretty => {
            println!("{}", serde_json::to_string_pretty(&report.json)?)
        }
        OutputFormat::Json => println!("{}", report.json),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from(["ladder", "--json", "price", "2632"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Command::Price { index: 2632 }));

        let cli = Cli::try_parse_from(["ladder", "price", "-1"]).unwrap();
        assert!(matches!(cli.command, Command::Price { index: -1 }));

        let cli = Cli::try_parse_from(["ladder", "table", "--step", "50", "--profile", "verbose"])
            .unwrap();
        assert_eq!(cli.profile.as_deref(), Some("verbose"));
        assert!(matches!(cli.command, Command::Table { step: Some(50), .. }));

        assert!(Cli::try_parse_from(["ladder", "mul", "1"]).is_err());
    }
}
