mod ingest;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::ingest::IngestCommands;

#[derive(Debug, Parser)]
#[command(name = "solarhub-cli")]
#[command(about = "solarhub content-ingestion command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Run one scraper batch on demand
    Ingest {
        #[command(subcommand)]
        command: IngestCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("solarhub-cli: nothing to do (try --help)");
        return Ok(());
    };

    let config = solarhub_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = solarhub_db::connect_pool_from_config(&config).await?;

    match command {
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            solarhub_db::ping(&pool).await?;
            println!("database: ok");
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            let applied = solarhub_db::run_migrations(&pool).await?;
            println!("migrations applied: {applied}");
        }
        Commands::Ingest { command } => ingest::run(command, pool, &config).await?,
    }

    Ok(())
}
