//! mirror CLI
//!
//! Registers the walkthrough types in a catalog and drives them through
//! reflection and dynamic function building.

use anyhow::Context;
use clap::{Parser, Subcommand};
use mirror_engine::EngineConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod walkthrough;

/// Config file picked up from the working directory when `--config` is absent
const DEFAULT_CONFIG_FILE: &str = "mirror.toml";

#[derive(Parser)]
#[command(name = "mirror")]
#[command(about = "Runtime type catalog and dynamic function builder", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a mirror.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay the reflection and emission walkthrough
    Demo,

    /// List the walkthrough types and their members
    Types {
        /// Include non-public members
        #[arg(short, long)]
        all: bool,
    },

    /// Build the adder function and print a + b
    Add {
        /// First operand
        #[arg(allow_negative_numbers = true)]
        a: i64,
        /// Second operand
        #[arg(allow_negative_numbers = true)]
        b: i64,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.exists() {
                EngineConfig::from_file(default)
                    .with_context(|| format!("Failed to load config from {}", DEFAULT_CONFIG_FILE))
            } else {
                Ok(EngineConfig::default())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let fallback = if cli.verbose { "mirror=debug,mirror_engine=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("MIRROR_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Demo => commands::demo::execute(&config),
        Commands::Types { all } => commands::types::execute(&config, all),
        Commands::Add { a, b } => commands::add::execute(&config, a, b),
    }
}
