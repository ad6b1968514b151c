//! Entry store kept as one JSON document in object storage.
//!
//! Used for local runs where no MySQL instance is available. The document
//! is read, modified and rewritten whole.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::LotteryEntry;
use crate::storage::{ObjectStore, read_json_optional, write_json};
use crate::store::LotteryStore;

pub struct DocumentLotteryStore {
    store: Arc<dyn ObjectStore>,
    key: String,
}

impl DocumentLotteryStore {
    pub fn new(store: Arc<dyn ObjectStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    async fn load(&self) -> Result<Vec<LotteryEntry>> {
        Ok(read_json_optional(self.store.as_ref(), &self.key)
            .await?
            .unwrap_or_default())
    }
}

#[async_trait]
impl LotteryStore for DocumentLotteryStore {
    async fn entries_for_season(&self, season: &str) -> Result<Vec<LotteryEntry>> {
        let entries = self.load().await?;
        Ok(entries.into_iter().filter(|e| e.season == season).collect())
    }

    async fn upsert_entries(&self, entries: &[LotteryEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut stored = self.load().await?;
        for entry in entries {
            match stored
                .iter_mut()
                .find(|e| e.user_name == entry.user_name && e.season == entry.season)
            {
                Some(existing) => existing.points = entry.points,
                None => stored.push(entry.clone()),
            }
        }

        write_json(self.store.as_ref(), &self.key, &stored).await?;
        log::debug!(
            "Upserted {} entries into {}",
            entries.len(),
            self.store.location(&self.key)
        );
        Ok(())
    }
}
