use clap::{Parser, Subcommand, builder::styling};
use csv_doc_etl::{Config, cli};
use eyre::Result;
use owo_colors::OwoColorize;
use std::num::NonZeroUsize;
use std::path::PathBuf;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// csvetl: bulk-load CSV files into a document store and search them
#[derive(Parser)]
#[command(name = "csvetl", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source configuration from
    #[arg(short, long, global = true, default_value = ".env")]
    env: String,

    /// More verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, transform and load the given CSV files
    Run {
        /// CSV files to load, each as its own invocation
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Records per bulk insert (overrides ETL_CHUNK_SIZE)
        #[arg(short, long)]
        chunk_size: Option<NonZeroUsize>,
    },

    /// Load every CSV file found in a data directory
    Ingest {
        /// Directory to scan for *.csv files
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,

        /// Records per bulk insert (overrides ETL_CHUNK_SIZE)
        #[arg(short, long)]
        chunk_size: Option<NonZeroUsize>,
    },

    /// Keyword search over the text-indexed field
    Search {
        /// Words to search for
        query: String,

        /// Maximum number of documents to return (overrides SEARCH_LIMIT)
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    match dotenvy::from_filename(&cli.env) {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => log::debug!("No dotenv file at {}", cli.env),
        Err(e) => return Err(e.into()),
    }
    let mut config = Config::from_env()?;

    match cli.command {
        Commands::Run { paths, chunk_size } => {
            if let Some(chunk_size) = chunk_size {
                config.chunk_size = chunk_size;
            }
            log::info!("Running pipeline for {} file(s)", paths.len().cyan());
            let count = cli::run(&paths, &config).await?;
            log::info!("✓ Loaded {} record(s)", count.green());
        }
        Commands::Ingest {
            data_dir,
            chunk_size,
        } => {
            if let Some(chunk_size) = chunk_size {
                config.chunk_size = chunk_size;
            }
            log::info!("Ingesting CSV files from {}", data_dir.display().bright_black());
            let count = cli::ingest(&data_dir, &config).await?;
            log::info!("✓ Ingested {} record(s)", count.green());
        }
        Commands::Search { query, limit } => {
            let limit = limit.unwrap_or(config.search_limit);
            log::debug!("Searching for '{}' (limit {})", query.cyan(), limit);
            let hits = cli::search(&query, limit, &config).await?;
            if hits.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            }
        }
    }

    Ok(())
}
