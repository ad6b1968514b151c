// src/services/seasons.rs

//! Season generation.
//!
//! Derives the next season from the history: a monotonic id, a name drawn
//! from collectible cards starting with the season letter, a start date a
//! few days ahead and one randomized stat per category.

use chrono::{DateTime, Duration, Utc};

use crate::error::{AppError, Result};
use crate::models::{LotteryConfig, LotteryStat, Season, SeasonPolicy, StatCategory};
use crate::services::random::{RandomSource, pick_index, round_to_step};

/// Builds new seasons according to a [`SeasonPolicy`].
#[derive(Debug, Clone)]
pub struct SeasonGenerator {
    policy: SeasonPolicy,
}

impl SeasonGenerator {
    pub fn new(policy: SeasonPolicy) -> Self {
        Self { policy }
    }

    /// Id following the last season of the history.
    pub fn next_id(&self, previous: &[Season]) -> i64 {
        previous
            .last()
            .and_then(|season| season.id.checked_add(1))
            .unwrap_or_else(|| self.policy.fallback_last_id.saturating_add(1))
    }

    /// Generate the season following `previous`.
    pub fn generate<R: RandomSource + ?Sized>(
        &self,
        previous: &[Season],
        config: &LotteryConfig,
        names: &[String],
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Season> {
        config.validate()?;

        let id = self.next_id(previous);
        let season_name = pick_name(id, names, rng)?;
        let start_date = now.date_naive() + Duration::days(self.policy.start_offset_days);

        let resource_stat = pick_stat(config, StatCategory::Resource, rng)?;
        let constructed_stat = pick_stat(config, StatCategory::Constructed, rng)?;
        let battlegrounds_stat = pick_stat(config, StatCategory::Battlegrounds, rng)?;

        Ok(Season {
            id,
            season_name,
            start_date: Some(start_date),
            duration_in_days: self.policy.duration_in_days,
            resource_stat,
            constructed_stat,
            battlegrounds_stat,
        })
    }
}

/// Letter a season name starts with: `A` for id 0, `B` for 1, wrapping at 26.
pub fn season_letter(id: i64) -> char {
    char::from(b'A' + id.rem_euclid(26) as u8)
}

fn pick_name<R: RandomSource + ?Sized>(id: i64, names: &[String], rng: &mut R) -> Result<String> {
    let letter = season_letter(id);
    let candidates: Vec<&String> = names
        .iter()
        .filter(|name| {
            name.chars()
                .next()
                .is_some_and(|first| first.eq_ignore_ascii_case(&letter))
        })
        .collect();

    if candidates.is_empty() {
        return Err(AppError::EmptyNamePool { letter });
    }

    Ok(candidates[pick_index(rng, candidates.len())].clone())
}

/// Points land on the step grid and may exceed `points_max` after rounding.
fn pick_stat<R: RandomSource + ?Sized>(
    config: &LotteryConfig,
    category: StatCategory,
    rng: &mut R,
) -> Result<LotteryStat> {
    let stats = config.stats(category);
    if stats.is_empty() {
        return Err(AppError::config(format!(
            "{} is empty",
            category.field_name()
        )));
    }
    let stat = &stats[pick_index(rng, stats.len())];
    let points = (rng.next_unit() * (stat.points_max - stat.points_min)).floor() + stat.points_min;

    Ok(LotteryStat {
        stat_type: stat.stat_type.clone(),
        points: round_to_step(points, stat.step),
    })
}
