//! Collectible card names used to name seasons.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::utils::http::fetch_json;

/// Source of the season-naming pool.
#[async_trait]
pub trait NameCatalog: Send + Sync {
    /// Distinct collectible card names, sorted.
    async fn collectible_names(&self) -> Result<Vec<String>>;
}

/// One card of the reference catalog; other fields are ignored.
#[derive(Debug, Deserialize)]
pub struct CardRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub collectible: bool,
}

/// Keep collectible, named cards; sort and deduplicate.
pub fn collectible_names(cards: Vec<CardRecord>) -> Vec<String> {
    let mut names: Vec<String> = cards
        .into_iter()
        .filter(|card| card.collectible)
        .filter_map(|card| card.name)
        .filter(|name| !name.trim().is_empty())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Catalog downloaded from a URL.
pub struct HttpCardCatalog {
    client: reqwest::Client,
    url: String,
}

impl HttpCardCatalog {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl NameCatalog for HttpCardCatalog {
    async fn collectible_names(&self) -> Result<Vec<String>> {
        log::debug!("Fetching card catalog from {}", self.url);
        let cards: Vec<CardRecord> = fetch_json(&self.client, &self.url).await?;
        let names = collectible_names(cards);
        log::info!("Loaded {} collectible card names", names.len());
        Ok(names)
    }
}

/// Catalog read from a JSON file on disk.
pub struct FileCardCatalog {
    path: PathBuf,
}

impl FileCardCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl NameCatalog for FileCardCatalog {
    async fn collectible_names(&self) -> Result<Vec<String>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            AppError::config(format!(
                "Card catalog {} unreadable: {}",
                self.path.display(),
                e
            ))
        })?;
        let cards: Vec<CardRecord> = serde_json::from_slice(&bytes)?;
        Ok(collectible_names(cards))
    }
}
