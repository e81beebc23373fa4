mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use airbnb_lib::{Scraper, ScraperConfig};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "airbnb")]
#[command(about = "Search Airbnb stays and fetch listing details")]
struct Cli {
    /// Output format: table, json or envelope
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// Fetch pages even when robots.txt disallows them
    #[arg(long, global = true)]
    ignore_robots_txt: bool,

    /// Site origin to scrape (defaults to AIRBNB_BASE_URL or the production site)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search stays by location or place id
    Search(commands::search::SearchArgs),
    /// Fetch the details of one listing
    Listing(commands::listing::ListingArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("airbnb=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        "envelope" => OutputFormat::Envelope,
        _ => OutputFormat::Table,
    };

    let config = apply_flags(ScraperConfig::from_env(), &cli);

    tracing::debug!("Scraping {}", config.client.base_url);
    let scraper = Scraper::new(config)?;
    scraper.initialize().await;

    match &cli.command {
        Commands::Search(args) => {
            commands::search::run(args, &scraper, cli.ignore_robots_txt, &format).await?
        }
        Commands::Listing(args) => {
            commands::listing::run(args, &scraper, cli.ignore_robots_txt, &format).await?
        }
    }

    Ok(())
}

/// Command-line flags override the environment.
fn apply_flags(config: ScraperConfig, cli: &Cli) -> ScraperConfig {
    let ignore_robots_txt = cli.ignore_robots_txt || config.ignore_robots_txt;
    let mut config = config.with_ignore_robots_txt(ignore_robots_txt);
    if let Some(ref base_url) = cli.base_url {
        config = config.with_base_url(base_url);
    }
    config
}
