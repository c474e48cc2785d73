use clap::Parser;
use cyclarb::adapter::inbound::cli::{self, command::Cli, diagnostic::CliError};

#[tokio::main]
async fn main() -> miette::Result<()> {
    let _ = dotenvy::dotenv();

    let args = Cli::parse();
    cli::dispatch(args).await.map_err(CliError::from)?;
    Ok(())
}
