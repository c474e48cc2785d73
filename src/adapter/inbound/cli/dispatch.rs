//! Global flag handling and command routing.

use super::command::{Cli, ColorChoice, Commands};
use super::output::{self, OutputConfig};
use super::{paths, run, status};
use crate::error::Result;

/// Apply global flags and run the selected command.
pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    match cli.command {
        Commands::Run(args) => run::execute(&args).await,
        Commands::Status(args) => status::execute(&args).await,
        Commands::Paths(args) => paths::execute(&args).await,
    }
}
