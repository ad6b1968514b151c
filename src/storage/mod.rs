//! Object storage abstractions for the lottery documents.
//!
//! Two JSON documents live in object storage:
//!
//! ```text
//! {bucket}/
//! ├── hearthstone/data/lottery-config.json   # candidate stats per category
//! └── hearthstone/data/lottery-seasons.json  # append-only season history
//! ```
//!
//! Both are read and rewritten as a whole, without concurrency checks.

pub mod local;
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{AppError, Result};
use crate::models::{LotteryConfig, Season, StorageConfig};

// Re-export for convenience
pub use local::LocalStorage;
pub use memory::MemoryStorage;

/// Trait for object storage backends.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read an object, returning `None` if it does not exist.
    async fn read_bytes_optional(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Create or overwrite an object.
    async fn write_bytes(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    /// Human-readable location of a key, for logs.
    fn location(&self, key: &str) -> String;
}

/// Read an object as UTF-8 text; a missing object is an error.
pub async fn read_text(store: &dyn ObjectStore, key: &str) -> Result<String> {
    let bytes = store
        .read_bytes_optional(key)
        .await?
        .ok_or_else(|| AppError::not_found(store.location(key)))?;

    String::from_utf8(bytes).map_err(|e| {
        AppError::validation(format!("{} is not valid UTF-8: {}", store.location(key), e))
    })
}

/// Read and parse a JSON object, returning `None` if it does not exist.
pub async fn read_json_optional<T: DeserializeOwned>(
    store: &dyn ObjectStore,
    key: &str,
) -> Result<Option<T>> {
    match store.read_bytes_optional(key).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Serialize a value as pretty JSON and write it.
pub async fn write_json<T: Serialize + ?Sized + Sync>(
    store: &dyn ObjectStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    store.write_bytes(key, bytes, "application/json").await
}

/// Outcome of loading the season history.
#[derive(Debug, Clone, PartialEq)]
pub enum SeasonHistory {
    /// Document parsed
    Loaded(Vec<Season>),
    /// No document yet
    Missing,
    /// Document exists but could not be parsed
    Corrupt { reason: String },
}

impl SeasonHistory {
    /// Seasons to build on; missing and corrupt documents count as empty.
    pub fn into_seasons(self) -> Vec<Season> {
        match self {
            SeasonHistory::Loaded(seasons) => seasons,
            SeasonHistory::Missing | SeasonHistory::Corrupt { .. } => Vec::new(),
        }
    }
}

/// Typed access to the lottery documents of one bucket.
#[derive(Clone)]
pub struct SeasonDocuments {
    store: Arc<dyn ObjectStore>,
    config_key: String,
    seasons_key: String,
}

impl SeasonDocuments {
    pub fn new(store: Arc<dyn ObjectStore>, paths: &StorageConfig) -> Self {
        Self {
            store,
            config_key: paths.config_key.clone(),
            seasons_key: paths.seasons_key.clone(),
        }
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    /// Load and validate the stat configuration document.
    pub async fn load_lottery_config(&self) -> Result<LotteryConfig> {
        let location = self.store.location(&self.config_key);
        log::debug!("Loading lottery config from {}", location);

        let text = read_text(self.store(), &self.config_key)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => {
                    AppError::config(format!("Lottery config not found at {location}"))
                }
                other => other,
            })?;

        let config: LotteryConfig = serde_json::from_str(&text).map_err(|e| {
            AppError::config(format!("Lottery config at {location} is invalid: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the season history, telling missing and corrupt documents apart.
    pub async fn load_history(&self) -> Result<SeasonHistory> {
        let location = self.store.location(&self.seasons_key);
        let Some(bytes) = self.store.read_bytes_optional(&self.seasons_key).await? else {
            log::info!("No season history at {}, starting from scratch", location);
            return Ok(SeasonHistory::Missing);
        };

        match serde_json::from_slice::<Option<Vec<Season>>>(&bytes) {
            Ok(seasons) => {
                let seasons = seasons.unwrap_or_default();
                log::debug!("Loaded {} seasons from {}", seasons.len(), location);
                Ok(SeasonHistory::Loaded(seasons))
            }
            Err(e) => {
                log::warn!(
                    "Season history at {} is corrupt ({}); treating it as empty",
                    location,
                    e
                );
                Ok(SeasonHistory::Corrupt {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Overwrite the season history document.
    pub async fn save_history(&self, seasons: &[Season]) -> Result<()> {
        write_json(self.store(), &self.seasons_key, seasons).await?;
        log::info!(
            "Wrote {} seasons to {}",
            seasons.len(),
            self.store.location(&self.seasons_key)
        );
        Ok(())
    }
}
