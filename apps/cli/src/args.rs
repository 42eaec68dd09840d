use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Scheduled maintenance jobs for the trivia bot backend.
#[derive(Parser, Debug)]
#[command(name = "bot-upkeep")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Sync subscription entitlements into billing credits
    Entitlements,

    /// Write one metrics sample to the graph table and prune old rows
    Graphs,

    /// Apply pending schema migrations and exit
    Migrate,
}
