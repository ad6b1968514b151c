// src/pipeline/new_season.rs

//! Season generation pipeline.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::Result;
use crate::models::Season;
use crate::services::{CycleSchedule, RandomSource, SeasonGenerator};

use super::LotteryContext;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewSeasonRequest {
    /// Run even outside a cycle day
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NewSeasonOutcome {
    Skipped { day_index: i64 },
    Created(Season),
}

/// Generate the next season and append it to the history document.
pub async fn run_new_season<R: RandomSource + Send + ?Sized>(
    ctx: &LotteryContext,
    request: &NewSeasonRequest,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<NewSeasonOutcome> {
    let schedule = CycleSchedule::from(&ctx.config.schedule);
    let day_index = schedule.day_index(now);
    if !request.force && !schedule.is_cycle_day(now) {
        log::info!("Day {} is not a cycle day, no new season", day_index);
        return Ok(NewSeasonOutcome::Skipped { day_index });
    }

    let lottery_config = ctx.documents.load_lottery_config().await?;
    let mut seasons = ctx.documents.load_history().await?.into_seasons();
    let names = ctx.catalog.collectible_names().await?;

    let generator = SeasonGenerator::new(ctx.config.season.clone());
    let season = generator.generate(&seasons, &lottery_config, &names, now, rng)?;
    log::info!(
        "Generated season {} '{}' starting {:?}",
        season.id,
        season.season_name,
        season.start_date
    );

    seasons.push(season.clone());
    ctx.documents.save_history(&seasons).await?;

    Ok(NewSeasonOutcome::Created(season))
}
