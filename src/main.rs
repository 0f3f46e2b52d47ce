use clap::{Parser, Subcommand};
use concert_scraper::config::Config;
use concert_scraper::db::SqliteStorage;
use concert_scraper::fetch::PageFetcher;
use concert_scraper::logging;
use concert_scraper::pipeline::Orchestrator;
use concert_scraper::storage::{seed_venues, Storage};
use concert_scraper::types::VenueExtractor;
use concert_scraper::venues::{all_extractors, create_extractor};
use std::sync::Arc;
use tracing::warn;

#[derive(Parser)]
#[command(name = "concert_scraper")]
#[command(about = "Scrapes venue calendar pages into a deduplicated concert store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, extract and persist concerts for the selected venues
    Run {
        /// Comma-separated venue identifiers (e.g. "chapel,bottom_of_the_hill").
        /// Defaults to every supported venue.
        #[arg(long)]
        venues: Option<String>,
    },
    /// Create the database file and seed the venue rows
    InitDb,
}

fn select_extractors(venues: Option<&str>) -> Vec<Box<dyn VenueExtractor>> {
    match venues {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .filter_map(|id| {
                let extractor = create_extractor(id);
                if extractor.is_none() {
                    warn!("Unknown venue identifier: {}", id);
                }
                extractor
            })
            .collect(),
        None => all_extractors(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = logging::init_logging();
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Run { venues } => {
            let extractors = select_extractors(venues.as_deref());
            if extractors.is_empty() {
                anyhow::bail!("no recognized venues selected");
            }

            let storage: Arc<dyn Storage> = Arc::new(SqliteStorage::open(&config.database_path)?);
            seed_venues(storage.as_ref()).await?;

            let fetcher = PageFetcher::new(&config)?;
            let orchestrator = Orchestrator::new(fetcher, storage);
            let summary = orchestrator.run(extractors).await;

            println!("🎸 Scrape complete");
            for venue in &summary.venues {
                println!(
                    "  {}: {} extracted, {} new, {} duplicates, {} skipped, {} errors",
                    venue.venue_name,
                    venue.extracted,
                    venue.inserted,
                    venue.duplicates,
                    venue.skipped,
                    venue.errors.len()
                );
            }
            println!(
                "✅ {} new concerts ({} duplicates, {} skipped, {} errors)",
                summary.total_inserted(),
                summary.total_duplicates(),
                summary.total_skipped(),
                summary.total_errors()
            );
        }
        Commands::InitDb => {
            let storage = SqliteStorage::open(&config.database_path)?;
            seed_venues(&storage).await?;
            println!("✅ Database ready at {}", config.database_path);
        }
    }

    Ok(())
}
