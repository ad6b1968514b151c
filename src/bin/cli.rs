//! Lottery CLI
//!
//! Local execution entry point. For AWS Lambda, use `lottery-lambda`.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use lottery::{
    clients::{FileCardCatalog, HttpCardCatalog, LogMailer, NameCatalog},
    error::Result,
    models::{Config, LotteryEntry, season_to_draw},
    pipeline::{self, DrawOutcome, DrawRequest, LotteryContext, NewSeasonOutcome, NewSeasonRequest},
    services::CycleSchedule,
    storage::{LocalStorage, ObjectStore, SeasonHistory},
    store::{DocumentLotteryStore, LotteryStore},
    utils::http,
};

/// Lottery - bi-weekly seasons and winner draws
#[derive(Parser, Debug)]
#[command(name = "lottery", version, about = "Bi-weekly lottery seasons and winner draws")]
struct Cli {
    /// Path to storage directory holding config and documents
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Card catalog file (default: {storage_dir}/cards.json, else download)
    #[arg(long)]
    cards: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the next season
    NewSeason {
        /// Run even outside a cycle day
        #[arg(long)]
        force: bool,
    },

    /// Draw winners and print the report
    PickWinners {
        /// Season to draw (default: the one that just ended)
        #[arg(long)]
        season: Option<String>,

        /// Run even outside a cycle day
        #[arg(long)]
        force: bool,
    },

    /// Record points for a player
    Submit {
        #[arg(long)]
        user: String,

        #[arg(long)]
        season: String,

        #[arg(long)]
        points: i64,
    },

    /// Validate configuration and documents
    Validate,

    /// Show season history info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn catalog(cli: &Cli, config: &Config) -> Result<Arc<dyn NameCatalog>> {
    let local = cli
        .cards
        .clone()
        .unwrap_or_else(|| cli.storage_dir.join("cards.json"));
    if local.exists() {
        log::info!("Using card catalog {}", local.display());
        return Ok(Arc::new(FileCardCatalog::new(local)));
    }
    let client = http::create_client(&config.http)?;
    Ok(Arc::new(HttpCardCatalog::new(
        client,
        config.catalog.cards_url.clone(),
    )))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    log::info!("Loaded configuration from {}", cli.storage_dir.display());

    let objects: Arc<dyn ObjectStore> = Arc::new(LocalStorage::new(&cli.storage_dir));
    let entries: Arc<dyn LotteryStore> = Arc::new(DocumentLotteryStore::new(
        objects.clone(),
        config.storage.entries_key.clone(),
    ));
    let ctx = LotteryContext::new(
        config.clone(),
        objects,
        entries,
        catalog(&cli, &config)?,
        Arc::new(LogMailer),
    );
    let now = Utc::now();
    let mut rng = StdRng::from_entropy();

    match cli.command {
        Command::NewSeason { force } => {
            match pipeline::run_new_season(&ctx, &NewSeasonRequest { force }, now, &mut rng).await? {
                NewSeasonOutcome::Skipped { day_index } => {
                    log::warn!("Day {} is not a cycle day. Use --force to run anyway.", day_index);
                }
                NewSeasonOutcome::Created(season) => {
                    println!("{}", serde_json::to_string_pretty(&season)?);
                }
            }
        }

        Command::PickWinners { season, force } => {
            let request = DrawRequest { season, force };
            match pipeline::run_draw(&ctx, &request, now, &mut rng).await? {
                DrawOutcome::Skipped { day_index } => {
                    log::warn!("Day {} is not a cycle day. Use --force to run anyway.", day_index);
                }
                DrawOutcome::Drawn(report) => {
                    print!("{}", report.render_text()?);
                }
            }
        }

        Command::Submit {
            user,
            season,
            points,
        } => {
            let entry = LotteryEntry::new(user, season, points);
            ctx.entries.upsert_entries(std::slice::from_ref(&entry)).await?;
            log::info!(
                "Recorded {} points for {} in season {}",
                entry.points,
                entry.user_name,
                entry.season
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            let lottery_config = ctx.documents.load_lottery_config().await?;
            log::info!(
                "✓ Lottery config OK ({} resource, {} constructed, {} battlegrounds stats)",
                lottery_config.configuration.resource_stats.len(),
                lottery_config.configuration.constructed_stats.len(),
                lottery_config.configuration.battlegrounds_stats.len()
            );

            match ctx.documents.load_history().await? {
                SeasonHistory::Loaded(seasons) => {
                    log::info!("✓ Season history OK ({} seasons)", seasons.len())
                }
                SeasonHistory::Missing => log::info!("Season history not created yet"),
                SeasonHistory::Corrupt { reason } => {
                    log::error!("Season history is corrupt: {}", reason);
                    return Err(lottery::error::AppError::validation(reason));
                }
            }

            log::info!("All validations passed!");
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());

            let schedule = CycleSchedule::from(&config.schedule);
            log::info!(
                "Cycle day index: {} ({})",
                schedule.day_index(now),
                if schedule.is_cycle_day(now) {
                    "cycle day"
                } else {
                    "not a cycle day"
                }
            );

            let seasons = ctx.documents.load_history().await?.into_seasons();
            match seasons.last() {
                Some(latest) => log::info!(
                    "Latest season: {} '{}' starting {}",
                    latest.id,
                    latest.season_name,
                    latest
                        .start_date
                        .map_or_else(|| "(undated)".to_string(), |d| d.to_string())
                ),
                None => log::info!("No seasons yet."),
            }
            if let Some(season) = season_to_draw(&seasons, now) {
                let entries = ctx.entries.entries_for_season(&season.key()).await?;
                log::info!(
                    "Next draw: season {} with {} entries",
                    season.id,
                    entries.len()
                );
            }
        }
    }

    Ok(())
}
