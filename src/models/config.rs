//! Application configuration structures.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Object storage locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// Season generation rules
    #[serde(default)]
    pub season: SeasonPolicy,

    /// Bi-weekly cycle gate
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Winner draw settings
    #[serde(default)]
    pub draw: DrawConfig,

    /// Winner report email
    #[serde(default)]
    pub report: ReportConfig,

    /// Card name catalog source
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Token validation endpoint
    #[serde(default)]
    pub auth: AuthConfig,

    /// Relational store connection
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Outgoing HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.storage.bucket.trim().is_empty() {
            return Err(AppError::validation("storage.bucket is empty"));
        }
        if self.storage.seasons_key.trim().is_empty() || self.storage.config_key.trim().is_empty()
        {
            return Err(AppError::validation("storage keys must not be empty"));
        }
        if self.season.duration_in_days == 0 {
            return Err(AppError::validation("season.duration_in_days must be > 0"));
        }
        if self.schedule.cycle_days <= 0 {
            return Err(AppError::validation("schedule.cycle_days must be > 0"));
        }
        if self.draw.winners_to_pick == 0 {
            return Err(AppError::validation("draw.winners_to_pick must be > 0"));
        }
        if self.report.to.is_empty() {
            return Err(AppError::validation("report.to has no recipients"));
        }
        if self.report.from.trim().is_empty() {
            return Err(AppError::validation("report.from is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

/// Object storage bucket and document keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "defaults::bucket")]
    pub bucket: String,

    /// Season history document
    #[serde(default = "defaults::seasons_key")]
    pub seasons_key: String,

    /// Stat configuration document
    #[serde(default = "defaults::config_key")]
    pub config_key: String,

    /// Entries document for the document-backed store (local runs)
    #[serde(default = "defaults::entries_key")]
    pub entries_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: defaults::bucket(),
            seasons_key: defaults::seasons_key(),
            config_key: defaults::config_key(),
            entries_key: defaults::entries_key(),
        }
    }
}

/// How new seasons are laid out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonPolicy {
    #[serde(default = "defaults::duration_in_days")]
    pub duration_in_days: u32,

    /// Days between generation and the season start
    #[serde(default = "defaults::start_offset_days")]
    pub start_offset_days: i64,

    /// Id assumed for the previous season when the history is empty
    #[serde(default)]
    pub fallback_last_id: i64,
}

impl Default for SeasonPolicy {
    fn default() -> Self {
        Self {
            duration_in_days: defaults::duration_in_days(),
            start_offset_days: defaults::start_offset_days(),
            fallback_last_id: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// First cycle day
    #[serde(default = "defaults::origin")]
    pub origin: NaiveDate,

    #[serde(default = "defaults::cycle_days")]
    pub cycle_days: i64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            origin: defaults::origin(),
            cycle_days: defaults::cycle_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawConfig {
    /// More than needed, in case some winners cannot be reached
    #[serde(default = "defaults::winners_to_pick")]
    pub winners_to_pick: usize,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            winners_to_pick: defaults::winners_to_pick(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "defaults::report_to")]
    pub to: Vec<String>,

    #[serde(default = "defaults::report_from")]
    pub from: String,

    #[serde(default = "defaults::report_reply_to")]
    pub reply_to: Vec<String>,

    #[serde(default = "defaults::report_subject")]
    pub subject: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            to: defaults::report_to(),
            from: defaults::report_from(),
            reply_to: defaults::report_reply_to(),
            subject: defaults::report_subject(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON array of cards with `name` and `collectible`
    #[serde(default = "defaults::cards_url")]
    pub cards_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            cards_url: defaults::cards_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Endpoint that exchanges a token for a user name
    #[serde(default)]
    pub validation_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `mysql://` connection string
    #[serde(default)]
    pub url: String,

    #[serde(default = "defaults::max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: defaults::max_connections(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

mod defaults {
    use chrono::NaiveDate;

    // Storage defaults
    pub fn bucket() -> String {
        "static.zerotoheroes.com".into()
    }
    pub fn seasons_key() -> String {
        "hearthstone/data/lottery-seasons.json".into()
    }
    pub fn config_key() -> String {
        "hearthstone/data/lottery-config.json".into()
    }
    pub fn entries_key() -> String {
        "hearthstone/data/lottery-entries.json".into()
    }

    // Season defaults
    pub fn duration_in_days() -> u32 {
        14
    }
    pub fn start_offset_days() -> i64 {
        2
    }

    // Schedule defaults
    pub fn origin() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 7, 17).unwrap_or_default()
    }
    pub fn cycle_days() -> i64 {
        14
    }

    // Draw defaults
    pub fn winners_to_pick() -> usize {
        8
    }

    // Report defaults
    pub fn report_to() -> Vec<String> {
        vec!["support@firestoneapp.com".into()]
    }
    pub fn report_from() -> String {
        "seb@firestoneapp.com".into()
    }
    pub fn report_reply_to() -> Vec<String> {
        vec!["seb@firestoneapp.com".into()]
    }
    pub fn report_subject() -> String {
        "Lottery winners".into()
    }

    // Catalog defaults
    pub fn cards_url() -> String {
        "https://static.zerotoheroes.com/hearthstone/jsoncards/cards.json".into()
    }

    // Database defaults
    pub fn max_connections() -> u32 {
        1
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; lottery/1.0)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn default_schedule_matches_first_draw() {
        let config = Config::default();
        assert_eq!(config.schedule.origin.to_string(), "2023-07-17");
        assert_eq!(config.schedule.cycle_days, 14);
        assert_eq!(config.draw.winners_to_pick, 8);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [season]
            fallback_last_id = 2

            [draw]
            winners_to_pick = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.season.fallback_last_id, 2);
        assert_eq!(config.season.duration_in_days, 14);
        assert_eq!(config.draw.winners_to_pick, 4);
        assert_eq!(config.storage.bucket, "static.zerotoheroes.com");
    }

    #[test]
    fn validate_rejects_zero_winners() {
        let mut config = Config::default();
        config.draw.winners_to_pick = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_missing_recipients() {
        let mut config = Config::default();
        config.report.to.clear();
        assert!(config.validate().is_err());
    }
}
