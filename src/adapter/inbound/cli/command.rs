//! Command-line interface definitions.
//!
//! Defines the CLI structure for the cyclarb binary using `clap`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Multi-hop token-swap arbitrage engine
#[derive(Parser, Debug)]
#[command(name = "cyclarb")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scan loop (foreground)
    Run(RunArgs),

    /// Show circuit breaker, wallet and path history state
    Status(StatusArgs),

    /// List the ranked path catalog
    Paths(PathsArgs),
}

/// Arguments for the `run` subcommand.
#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Simulate executions instead of broadcasting.
    #[arg(long)]
    pub dry_run: bool,

    /// Run a single cycle and exit.
    #[arg(long)]
    pub once: bool,

    /// Override log level (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Arguments for the `status` subcommand.
#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Path history rows to show.
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

/// Arguments for the `paths` subcommand.
#[derive(clap::Args, Debug)]
pub struct PathsArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}
