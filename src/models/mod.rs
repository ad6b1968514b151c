// src/models/mod.rs

//! Domain models for the lottery application.

mod config;
mod entry;
mod season;
mod stats;

// Re-export all public types
pub use config::{
    AuthConfig, CatalogConfig, Config, DatabaseConfig, DrawConfig, HttpConfig,
    ReportConfig, ScheduleConfig, SeasonPolicy, StorageConfig,
};
pub use entry::{LotteryEntry, MAX_SUBMITTED_POINTS, PointSubmission, SubmissionBody};
pub use season::{LotteryStat, Season, season_to_draw};
pub use stats::{LotteryConfig, LotteryConfigStat, StatCategory, StatPools};

#[cfg(test)]
pub(crate) mod fixtures {
    pub(crate) use super::season::sample_season;
    pub(crate) use super::stats::{single_stat_config, stat};
}
