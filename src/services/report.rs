// src/services/report.rs

//! Winner report sent after each draw.

use serde::Serialize;

use crate::error::Result;
use crate::models::{LotteryEntry, ReportConfig};

/// Result of a draw for one season.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WinnerReport {
    pub season: String,
    pub total_points: i64,
    pub entry_count: usize,
    pub winners: Vec<LotteryEntry>,
}

impl WinnerReport {
    pub fn new(season: impl Into<String>, entries: &[LotteryEntry], winners: Vec<LotteryEntry>) -> Self {
        Self {
            season: season.into(),
            total_points: entries
                .iter()
                .fold(0i64, |total, e| total.saturating_add(e.points)),
            entry_count: entries.len(),
            winners,
        }
    }

    pub fn winner_names(&self) -> Vec<&str> {
        self.winners.iter().map(|w| w.user_name.as_str()).collect()
    }

    /// Plain-text email body.
    pub fn render_text(&self) -> Result<String> {
        let details = serde_json::to_string_pretty(&self.winners)?;
        Ok(format!(
            "Season: {}\nTotal points: {}\nWinners: {}\n\n{}\n",
            self.season,
            self.total_points,
            self.winner_names().join(", "),
            details
        ))
    }

    pub fn to_email(&self, config: &ReportConfig) -> Result<Email> {
        Ok(Email {
            to: config.to.clone(),
            from: config.from.clone(),
            reply_to: config.reply_to.clone(),
            subject: config.subject.clone(),
            body: self.render_text()?,
        })
    }
}

/// A plain-text email.
#[derive(Debug, Clone, PartialEq)]
pub struct Email {
    pub to: Vec<String>,
    pub from: String,
    pub reply_to: Vec<String>,
    pub subject: String,
    pub body: String,
}
