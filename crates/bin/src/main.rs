use clap::Parser;
use tracing_subscriber::EnvFilter;

mod backend;
mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use output::OutputFormat;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("slotlist=info".parse()?))
        .init();

    let cli = Cli::parse();
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    tracing::debug!("Using {}", backend::backend_label(&cli.backend_config));

    let backend_args = &cli.backend_config;
    let list_args = &cli.list_config;
    match &cli.command {
        Commands::Show(args) => commands::show::run(backend_args, list_args, args, format).await,
        Commands::Move(args) => commands::r#move::run(backend_args, list_args, args, format).await,
        Commands::Insert(args) => {
            commands::insert::run(backend_args, list_args, args, format).await
        }
        Commands::Remove(args) => {
            commands::remove::run(backend_args, list_args, args, format).await
        }
        Commands::Check(args) => commands::check::run(backend_args, list_args, args, format).await,
    }
}
