//! MySQL entry store.
//!
//! Schema: `lottery(userName, season, points)` with a unique key on
//! `(userName, season)`.

use async_trait::async_trait;
use sqlx::mysql::{MySql, MySqlPool, MySqlPoolOptions};
use sqlx::QueryBuilder;

use crate::error::{AppError, Result};
use crate::models::{DatabaseConfig, LotteryEntry};
use crate::store::LotteryStore;

const SELECT_SEASON: &str =
    "SELECT userName, season, CAST(points AS SIGNED) AS points FROM lottery WHERE season = ?";

/// Entry store backed by a MySQL pool.
#[derive(Clone)]
pub struct MySqlLotteryStore {
    pool: MySqlPool,
}

impl MySqlLotteryStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Connect using the configured URL.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(AppError::config("database.url is not set"));
        }
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect(&config.url)
            .await
            .map_err(AppError::database)?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl LotteryStore for MySqlLotteryStore {
    async fn entries_for_season(&self, season: &str) -> Result<Vec<LotteryEntry>> {
        sqlx::query_as::<_, LotteryEntry>(SELECT_SEASON)
            .bind(season)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::database)
    }

    async fn upsert_entries(&self, entries: &[LotteryEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut builder =
            QueryBuilder::<MySql>::new("INSERT INTO lottery (userName, season, points) ");
        builder.push_values(entries, |mut row, entry| {
            row.push_bind(entry.user_name.clone())
                .push_bind(entry.season.clone())
                .push_bind(entry.points);
        });
        builder.push(" ON DUPLICATE KEY UPDATE points = VALUES(points)");

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(AppError::database)?;

        log::info!(
            "Upserted {} lottery rows ({} affected)",
            entries.len(),
            result.rows_affected()
        );
        Ok(())
    }
}
