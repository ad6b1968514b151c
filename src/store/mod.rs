//! Lottery entry stores.
//!
//! Rows are keyed by `(userName, season)`. An upsert overwrites the stored
//! points with the submitted value; within one batch the last row for a key
//! wins.

pub mod document;
#[cfg(feature = "mysql")]
pub mod mysql;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::LotteryEntry;

pub use document::DocumentLotteryStore;
#[cfg(feature = "mysql")]
pub use mysql::MySqlLotteryStore;

/// Trait for lottery entry backends.
#[async_trait]
pub trait LotteryStore: Send + Sync {
    /// All entries recorded for a season.
    async fn entries_for_season(&self, season: &str) -> Result<Vec<LotteryEntry>>;

    /// Insert rows, overwriting points of existing `(userName, season)` rows.
    async fn upsert_entries(&self, entries: &[LotteryEntry]) -> Result<()>;
}
