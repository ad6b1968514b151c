// src/lambda/mod.rs

//! AWS Lambda handlers for the lottery.
//!
//! One binary serves four functions; `LOTTERY_HANDLER` selects which:
//! 1. `new-season`: scheduled, appends the next season to the history
//! 2. `pick-winners`: scheduled, draws the season that just ended
//! 3. `process-submissions`: SQS batches of point submissions
//! 4. `update-submission`: API Gateway, one submission per request
//!
//! Clients are built per invocation. Failures propagate so the trigger's
//! retry policy applies.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use lambda_runtime::{Error as LambdaError, LambdaEvent};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::clients::{HttpCardCatalog, HttpTokenValidator, SesMailer};
use crate::config::StoredConfigLoader;
use crate::error::{AppError, Result};
use crate::models::Config;
use crate::pipeline::{
    self, DrawOutcome, DrawRequest, LotteryContext, NewSeasonOutcome, NewSeasonRequest,
    SubmissionOutcome,
};
use crate::storage::ObjectStore;
use crate::storage::s3::S3Storage;
use crate::store::{DocumentLotteryStore, LotteryStore, MySqlLotteryStore};
use crate::utils::http::create_client;

/// Which pipeline this function runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    NewSeason,
    PickWinners,
    ProcessSubmissions,
    UpdateSubmission,
}

impl HandlerKind {
    pub const ENV_VAR: &'static str = "LOTTERY_HANDLER";

    pub fn from_env() -> Result<Self> {
        let value = std::env::var(Self::ENV_VAR)
            .map_err(|_| AppError::config(format!("{} is not set", Self::ENV_VAR)))?;
        value.parse()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerKind::NewSeason => "new-season",
            HandlerKind::PickWinners => "pick-winners",
            HandlerKind::ProcessSubmissions => "process-submissions",
            HandlerKind::UpdateSubmission => "update-submission",
        }
    }
}

impl FromStr for HandlerKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "new-season" => Ok(HandlerKind::NewSeason),
            "pick-winners" => Ok(HandlerKind::PickWinners),
            "process-submissions" => Ok(HandlerKind::ProcessSubmissions),
            "update-submission" => Ok(HandlerKind::UpdateSubmission),
            other => Err(AppError::config(format!("Unknown handler '{other}'"))),
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SQS batch; only the message bodies matter.
#[derive(Debug, Deserialize)]
pub struct QueueEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<QueueRecord>,
}

#[derive(Debug, Deserialize)]
pub struct QueueRecord {
    #[serde(default)]
    pub body: String,
}

/// API Gateway proxy request.
#[derive(Debug, Deserialize)]
pub struct ApiRequest {
    #[serde(default)]
    pub body: Option<String>,
}

/// API Gateway proxy response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LambdaResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl LambdaResponse {
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    /// Success carries no body.
    pub fn ok() -> Self {
        Self::new(200, "")
    }
}

impl From<SubmissionOutcome> for LambdaResponse {
    fn from(outcome: SubmissionOutcome) -> Self {
        match outcome {
            SubmissionOutcome::Accepted(_) => Self::ok(),
            SubmissionOutcome::Rejected => Self::new(403, "Invalid or missing token"),
            SubmissionOutcome::Malformed => Self::new(400, "Malformed submission"),
        }
    }
}

/// Main Lambda handler function.
#[instrument(skip(event), fields(handler = %kind))]
pub async fn handler(
    kind: HandlerKind,
    event: LambdaEvent<Value>,
) -> std::result::Result<LambdaResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (payload, context) = event.into_parts();
    info!(request_id = %context.request_id, "Starting {}", kind);

    let config = load_lambda_config().await?;
    let response = match kind {
        HandlerKind::NewSeason => new_season(config, payload).await?,
        HandlerKind::PickWinners => pick_winners(config, payload).await?,
        HandlerKind::ProcessSubmissions => process_submissions(config, payload).await?,
        HandlerKind::UpdateSubmission => update_submission(config, payload).await?,
    };

    info!(
        status = response.status_code,
        "{} completed in {}ms",
        kind,
        start.elapsed().as_millis()
    );
    Ok(response)
}

async fn new_season(config: Config, payload: Value) -> Result<LambdaResponse> {
    let request: NewSeasonRequest = parse_or_default(payload);
    let ctx = scheduled_context(config).await?;
    let mut rng = StdRng::from_entropy();

    match pipeline::run_new_season(&ctx, &request, Utc::now(), &mut rng).await? {
        NewSeasonOutcome::Skipped { day_index } => info!(day_index, "No season created"),
        NewSeasonOutcome::Created(season) => {
            info!(season = season.id, name = %season.season_name, "Season created")
        }
    }
    Ok(LambdaResponse::ok())
}

async fn pick_winners(config: Config, payload: Value) -> Result<LambdaResponse> {
    let request: DrawRequest = parse_or_default(payload);
    let ctx = scheduled_context(config).await?;
    let mut rng = StdRng::from_entropy();

    match pipeline::run_draw(&ctx, &request, Utc::now(), &mut rng).await? {
        DrawOutcome::Skipped { day_index } => info!(day_index, "No draw"),
        DrawOutcome::Drawn(report) => info!(
            season = %report.season,
            entries = report.entry_count,
            "Winners: {}",
            report.winner_names().join(", ")
        ),
    }
    Ok(LambdaResponse::ok())
}

async fn process_submissions(config: Config, payload: Value) -> Result<LambdaResponse> {
    let event: QueueEvent = serde_json::from_value(payload)?;
    info!("Processing {} queued messages", event.records.len());
    let bodies: Vec<String> = event.records.into_iter().map(|r| r.body).collect();

    let (store, validator) = submission_clients(&config).await?;
    let summary = pipeline::process_batch(store.as_ref(), &validator, &bodies).await?;
    info!(
        accepted = summary.accepted,
        dropped = summary.dropped(),
        malformed = summary.malformed,
        "Batch recorded"
    );
    Ok(LambdaResponse::ok())
}

async fn update_submission(config: Config, payload: Value) -> Result<LambdaResponse> {
    let request: ApiRequest = match serde_json::from_value(payload) {
        Ok(request) => request,
        Err(e) => {
            warn!("Unreadable API request: {}", e);
            return Ok(SubmissionOutcome::Malformed.into());
        }
    };
    let body = request.body.unwrap_or_default();

    let (store, validator) = submission_clients(&config).await?;
    let outcome = pipeline::update_single(store.as_ref(), &validator, &body).await?;
    Ok(outcome.into())
}

/// Scheduled payloads are optional; anything unreadable means defaults.
fn parse_or_default<T: DeserializeOwned + Default>(payload: Value) -> T {
    if payload.is_null() {
        return T::default();
    }
    serde_json::from_value(payload).unwrap_or_else(|e| {
        warn!("Ignoring unreadable payload: {}", e);
        T::default()
    })
}

/// Defaults, optionally replaced by a TOML document in the bucket, then
/// environment overrides.
async fn load_lambda_config() -> Result<Config> {
    let mut config = Config::default();
    config.apply_env();

    if let Ok(key) = std::env::var("CONFIG_S3_KEY") {
        let storage = S3Storage::from_env(config.storage.bucket.clone()).await;
        config = StoredConfigLoader::new(&storage).load_config(&key).await?;
        config.apply_env();
    }

    config.validate()?;
    Ok(config)
}

/// Entries live in MySQL when configured, otherwise in a bucket document.
async fn entry_store(
    config: &Config,
    objects: Arc<dyn ObjectStore>,
) -> Result<Arc<dyn LotteryStore>> {
    if config.database.url.trim().is_empty() {
        info!(
            "No database configured, using {}",
            objects.location(&config.storage.entries_key)
        );
        return Ok(Arc::new(DocumentLotteryStore::new(
            objects,
            config.storage.entries_key.clone(),
        )));
    }
    Ok(Arc::new(MySqlLotteryStore::connect(&config.database).await?))
}

async fn scheduled_context(config: Config) -> Result<LotteryContext> {
    let objects: Arc<dyn ObjectStore> =
        Arc::new(S3Storage::from_env(config.storage.bucket.clone()).await);
    let entries = entry_store(&config, objects.clone()).await?;
    let client = create_client(&config.http)?;
    let catalog = Arc::new(HttpCardCatalog::new(client, config.catalog.cards_url.clone()));
    let mailer = Arc::new(SesMailer::from_env().await);

    Ok(LotteryContext::new(config, objects, entries, catalog, mailer))
}

async fn submission_clients(
    config: &Config,
) -> Result<(Arc<dyn LotteryStore>, HttpTokenValidator)> {
    let objects: Arc<dyn ObjectStore> =
        Arc::new(S3Storage::from_env(config.storage.bucket.clone()).await);
    let store = entry_store(config, objects).await?;
    let validator =
        HttpTokenValidator::new(create_client(&config.http)?, config.auth.validation_url.clone())?;
    Ok((store, validator))
}
