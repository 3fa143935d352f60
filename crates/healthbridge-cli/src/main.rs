use clap::{Parser, Subcommand};
use std::path::PathBuf;

use healthbridge_core::Config;

use app::App;

mod app;
mod commands;
mod dates;
mod logging;

#[derive(Parser)]
#[command(name = "healthbridge", version, about = "HealthBridge CLI")]
struct Cli {
    /// SQLite sample store to use instead of the configured one
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse metric categories and types
    Catalog {
        #[command(subcommand)]
        action: commands::catalog::CatalogAction,
    },
    /// Request read and write access to metric types
    Auth(commands::auth::AuthArgs),
    /// List stored samples of one type
    Query(commands::query::QueryArgs),
    /// Print selected samples as a wire string
    Export(commands::export::ExportArgs),
    /// Save samples from a wire string
    Import(commands::import::ImportArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    logging::init(&config.logging.level, cli.verbose);

    if let Err(e) = run(cli.command, config, cli.store).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(
    command: Commands,
    config: Config,
    store: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Catalog { action } => commands::catalog::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Auth(args) => commands::auth::run(args, &App::open(config, store)?).await,
        Commands::Query(args) => commands::query::run(args, &App::open(config, store)?).await,
        Commands::Export(args) => commands::export::run(args, &App::open(config, store)?).await,
        Commands::Import(args) => commands::import::run(args, &App::open(config, store)?).await,
    }
}
