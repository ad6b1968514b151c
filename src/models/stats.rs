//! Lottery stat configuration, read from the config document.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Random range and rounding step for one candidate stat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LotteryConfigStat {
    #[serde(rename = "type")]
    pub stat_type: String,
    pub points_min: f64,
    pub points_max: f64,
    pub step: f64,
}

impl LotteryConfigStat {
    fn validate(&self, category: StatCategory) -> Result<()> {
        let values = [self.points_min, self.points_max, self.step];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(AppError::config(format!(
                "{}: stat '{}' has non-finite values",
                category.field_name(),
                self.stat_type
            )));
        }
        if self.step <= 0.0 {
            return Err(AppError::config(format!(
                "{}: stat '{}' needs step > 0",
                category.field_name(),
                self.stat_type
            )));
        }
        if self.points_max < self.points_min {
            return Err(AppError::config(format!(
                "{}: stat '{}' has pointsMax < pointsMin",
                category.field_name(),
                self.stat_type
            )));
        }
        Ok(())
    }
}

/// The three point-earning dimensions of a season.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatCategory {
    Resource,
    Constructed,
    Battlegrounds,
}

impl StatCategory {
    /// Draw order used by the season generator.
    pub const ALL: [StatCategory; 3] = [
        StatCategory::Resource,
        StatCategory::Constructed,
        StatCategory::Battlegrounds,
    ];

    pub fn field_name(&self) -> &'static str {
        match self {
            StatCategory::Resource => "resourceStats",
            StatCategory::Constructed => "constructedStats",
            StatCategory::Battlegrounds => "battlegroundsStats",
        }
    }
}

/// Candidate stats per category.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatPools {
    #[serde(default)]
    pub resource_stats: Vec<LotteryConfigStat>,
    #[serde(default)]
    pub constructed_stats: Vec<LotteryConfigStat>,
    #[serde(default)]
    pub battlegrounds_stats: Vec<LotteryConfigStat>,
}

/// The lottery configuration document.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LotteryConfig {
    pub configuration: StatPools,
}

impl LotteryConfig {
    pub fn stats(&self, category: StatCategory) -> &[LotteryConfigStat] {
        let pools = &self.configuration;
        match category {
            StatCategory::Resource => &pools.resource_stats,
            StatCategory::Constructed => &pools.constructed_stats,
            StatCategory::Battlegrounds => &pools.battlegrounds_stats,
        }
    }

    /// Every category must offer at least one well-formed stat.
    pub fn validate(&self) -> Result<()> {
        for category in StatCategory::ALL {
            let stats = self.stats(category);
            if stats.is_empty() {
                return Err(AppError::config(format!(
                    "{} is empty",
                    category.field_name()
                )));
            }
            for stat in stats {
                stat.validate(category)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn stat(stat_type: &str, min: f64, max: f64, step: f64) -> LotteryConfigStat {
    LotteryConfigStat {
        stat_type: stat_type.to_string(),
        points_min: min,
        points_max: max,
        step,
    }
}

#[cfg(test)]
pub(crate) fn single_stat_config(min: f64, max: f64, step: f64) -> LotteryConfig {
    LotteryConfig {
        configuration: StatPools {
            resource_stats: vec![stat("r", min, max, step)],
            constructed_stats: vec![stat("c", min, max, step)],
            battlegrounds_stats: vec![stat("b", min, max, step)],
        },
    }
}
