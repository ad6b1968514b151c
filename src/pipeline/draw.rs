// src/pipeline/draw.rs

//! Winner draw pipeline.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::season_to_draw;
use crate::services::{CycleSchedule, RandomSource, WinnerPicker, WinnerReport};

use super::LotteryContext;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DrawRequest {
    /// Draw this season instead of the one that just ended
    pub season: Option<String>,
    /// Run even outside a cycle day
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOutcome {
    Skipped { day_index: i64 },
    Drawn(WinnerReport),
}

/// Pick winners for a season and mail the report.
///
/// Without an explicit season, the draw targets the second most recent
/// season that has started, i.e. the one that just ended.
pub async fn run_draw<R: RandomSource + Send + ?Sized>(
    ctx: &LotteryContext,
    request: &DrawRequest,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<DrawOutcome> {
    let schedule = CycleSchedule::from(&ctx.config.schedule);
    let day_index = schedule.day_index(now);
    if !request.force && request.season.is_none() && !schedule.is_cycle_day(now) {
        log::info!("Day {} is not a cycle day, no draw", day_index);
        return Ok(DrawOutcome::Skipped { day_index });
    }

    let season = match &request.season {
        Some(season) => season.clone(),
        None => {
            let seasons = ctx.documents.load_history().await?.into_seasons();
            season_to_draw(&seasons, now)
                .map(|s| s.key())
                .ok_or_else(|| AppError::config("No season available to draw"))?
        }
    };
    log::info!("Drawing winners for season {}", season);

    let entries = ctx.entries.entries_for_season(&season).await?;
    log::info!("Season {} has {} entries", season, entries.len());

    let picker = WinnerPicker::new(ctx.config.draw.winners_to_pick);
    let winners = picker.pick(entries.clone(), rng);
    let report = WinnerReport::new(season, &entries, winners);

    let email = report.to_email(&ctx.config.report)?;
    ctx.mailer.send(&email).await?;
    log::info!(
        "Reported {} winners for season {}: {}",
        report.winners.len(),
        report.season,
        report.winner_names().join(", ")
    );

    Ok(DrawOutcome::Drawn(report))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;
    use crate::models::fixtures::sample_season;
    use crate::models::{Config, LotteryEntry};
    use crate::pipeline::fakes::{FixedCatalog, RecordingMailer};
    use crate::services::random::Scripted;
    use crate::storage::MemoryStorage;
    use crate::store::{DocumentLotteryStore, LotteryStore};

    struct Fixture {
        mailer: Arc<RecordingMailer>,
        ctx: LotteryContext,
    }

    async fn fixture(mailer: RecordingMailer) -> Fixture {
        let config = Config::default();
        let storage = Arc::new(MemoryStorage::new());
        let entries = Arc::new(DocumentLotteryStore::new(
            storage.clone(),
            config.storage.entries_key.clone(),
        ));
        entries
            .upsert_entries(&[
                LotteryEntry::new("alice", "5", 30),
                LotteryEntry::new("bob", "5", 70),
                LotteryEntry::new("carol", "6", 10),
            ])
            .await
            .unwrap();

        let seasons = vec![
            sample_season(4, "2023-07-03"),
            sample_season(5, "2023-07-17"),
            sample_season(6, "2023-07-31"),
            sample_season(7, "2023-08-14"),
        ];
        storage.insert(
            &config.storage.seasons_key,
            &serde_json::to_string(&seasons).unwrap(),
        );

        let mailer = Arc::new(mailer);
        let ctx = LotteryContext::new(
            config,
            storage.clone(),
            entries,
            Arc::new(FixedCatalog(Vec::new())),
            mailer.clone(),
        );
        Fixture { mailer, ctx }
    }

    #[tokio::test]
    async fn draws_the_season_that_just_ended() {
        let f = fixture(RecordingMailer::default()).await;
        // Season 6 started at midnight, so season 5 just ended.
        let now = Utc.with_ymd_and_hms(2023, 7, 31, 9, 0, 0).unwrap();

        let outcome = run_draw(&f.ctx, &DrawRequest::default(), now, &mut Scripted::new(&[0.5]))
            .await
            .unwrap();

        let DrawOutcome::Drawn(report) = outcome else {
            panic!("expected a draw");
        };
        assert_eq!(report.season, "5");
        assert_eq!(report.total_points, 100);
        let mut names = report.winner_names();
        names.sort();
        assert_eq!(names, vec!["alice", "bob"]);

        let sent = f.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.starts_with("Season: 5\nTotal points: 100\n"));
    }

    #[tokio::test]
    async fn skips_outside_cycle_days_without_override() {
        let f = fixture(RecordingMailer::default()).await;
        let now = Utc.with_ymd_and_hms(2023, 8, 2, 9, 0, 0).unwrap();

        let outcome = run_draw(&f.ctx, &DrawRequest::default(), now, &mut Scripted::new(&[0.5]))
            .await
            .unwrap();

        assert_eq!(outcome, DrawOutcome::Skipped { day_index: 16 });
        assert!(f.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn season_override_bypasses_gate() {
        let f = fixture(RecordingMailer::default()).await;
        let now = Utc.with_ymd_and_hms(2023, 8, 2, 9, 0, 0).unwrap();
        let request = DrawRequest {
            season: Some("6".into()),
            force: false,
        };

        let outcome = run_draw(&f.ctx, &request, now, &mut Scripted::new(&[0.5]))
            .await
            .unwrap();

        let DrawOutcome::Drawn(report) = outcome else {
            panic!("expected a draw");
        };
        assert_eq!(report.winner_names(), vec!["carol"]);
    }

    #[tokio::test]
    async fn season_without_entries_reports_no_winners() {
        let f = fixture(RecordingMailer::default()).await;
        let request = DrawRequest {
            season: Some("99".into()),
            force: false,
        };

        let outcome = run_draw(&f.ctx, &request, Utc::now(), &mut Scripted::new(&[0.5]))
            .await
            .unwrap();

        let DrawOutcome::Drawn(report) = outcome else {
            panic!("expected a draw");
        };
        assert!(report.winners.is_empty());
        assert_eq!(f.mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn mail_failure_propagates() {
        let f = fixture(RecordingMailer {
            broken: true,
            ..Default::default()
        })
        .await;
        let request = DrawRequest {
            season: Some("5".into()),
            force: false,
        };

        let err = run_draw(&f.ctx, &request, Utc::now(), &mut Scripted::new(&[0.5]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Mail(_)));
    }
}
