// src/config.rs

//! Configuration loading utilities.
//!
//! Local runs read `config.toml` from the storage directory. Lambda starts
//! from defaults (or a TOML document in the bucket) and applies environment
//! overrides on top.

use std::str::FromStr;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::storage::{ObjectStore, read_text};

/// Loads a TOML base config from object storage.
pub struct StoredConfigLoader<'a> {
    store: &'a dyn ObjectStore,
}

impl<'a> StoredConfigLoader<'a> {
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self { store }
    }

    pub async fn load_config(&self, key: &str) -> Result<Config> {
        log::info!("Loading config file from {}", self.store.location(key));
        let text = read_text(self.store, key).await.map_err(|e| match e {
            AppError::NotFound(location) => {
                AppError::config(format!("Config file not found: {location}"))
            }
            other => other,
        })?;
        Config::from_toml(&text)
    }
}

impl Config {
    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; unparseable values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(bucket) = text("S3_BUCKET") {
            self.storage.bucket = bucket;
        }
        if let Some(key) = text("LOTTERY_SEASONS_KEY") {
            self.storage.seasons_key = key;
        }
        if let Some(key) = text("LOTTERY_CONFIG_KEY") {
            self.storage.config_key = key;
        }
        if let Some(n) = parsed::<usize>(&text, "WINNERS_TO_PICK") {
            self.draw.winners_to_pick = n;
        }
        if let Some(to) = text("REPORT_TO") {
            self.report.to = to
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(from) = text("REPORT_FROM") {
            self.report.from = from;
        }
        if let Some(url) = text("CARDS_URL") {
            self.catalog.cards_url = url;
        }
        if let Some(url) = text("TOKEN_VALIDATION_URL") {
            self.auth.validation_url = url;
        }
        if let Some(url) = text("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(id) = parsed::<i64>(&text, "SEASON_FALLBACK_ID") {
            self.season.fallback_last_id = id;
        }
        if let Some(origin) = parsed::<chrono::NaiveDate>(&text, "SCHEDULE_ORIGIN") {
            self.schedule.origin = origin;
        }
    }
}

fn parsed<T: FromStr>(text: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let value = text(key)?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            log::warn!("Ignoring {}={:?}: cannot parse", key, value);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::storage::MemoryStorage;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn overrides_replace_defaults() {
        let vars = env(&[
            ("S3_BUCKET", "test-bucket"),
            ("WINNERS_TO_PICK", "3"),
            ("REPORT_TO", "a@example.com, b@example.com,"),
            ("DATABASE_URL", "mysql://lottery@localhost/lottery"),
            ("SEASON_FALLBACK_ID", "41"),
            ("SCHEDULE_ORIGIN", "2024-01-01"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).cloned());

        assert_eq!(config.storage.bucket, "test-bucket");
        assert_eq!(config.draw.winners_to_pick, 3);
        assert_eq!(config.report.to, vec!["a@example.com", "b@example.com"]);
        assert_eq!(config.database.url, "mysql://lottery@localhost/lottery");
        assert_eq!(config.season.fallback_last_id, 41);
        assert_eq!(config.schedule.origin.to_string(), "2024-01-01");
        assert_eq!(config.storage.seasons_key, Config::default().storage.seasons_key);
    }

    #[test]
    fn bad_values_are_ignored() {
        let vars = env(&[("WINNERS_TO_PICK", "many"), ("SCHEDULE_ORIGIN", "soon"), ("S3_BUCKET", "  ")]);
        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).cloned());

        let defaults = Config::default();
        assert_eq!(config.draw.winners_to_pick, defaults.draw.winners_to_pick);
        assert_eq!(config.schedule.origin, defaults.schedule.origin);
        assert_eq!(config.storage.bucket, defaults.storage.bucket);
    }

    #[tokio::test]
    async fn loads_config_from_object_store() {
        let store = MemoryStorage::new();
        store.insert("lottery/config.toml", "[draw]\nwinners_to_pick = 5\n");

        let loader = StoredConfigLoader::new(&store);
        let config = loader.load_config("lottery/config.toml").await.unwrap();
        assert_eq!(config.draw.winners_to_pick, 5);

        let err = loader.load_config("lottery/missing.toml").await.unwrap_err();
        assert!(err.is_configuration());
    }
}
