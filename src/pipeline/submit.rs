// src/pipeline/submit.rs

//! Point submission pipelines.

use futures::future::join_all;
use serde::Serialize;

use crate::clients::TokenValidator;
use crate::error::{AppError, Result};
use crate::models::{LotteryEntry, PointSubmission, SubmissionBody};
use crate::store::LotteryStore;

/// Counts for one processed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub messages: usize,
    pub malformed: usize,
    pub submissions: usize,
    pub accepted: usize,
}

impl BatchSummary {
    pub fn dropped(&self) -> usize {
        self.submissions - self.accepted
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Accepted(LotteryEntry),
    Rejected,
    Malformed,
}

/// Parse message bodies; returns the submissions and the number of bodies
/// that could not be read.
pub fn parse_batch<S: AsRef<str>>(bodies: &[S]) -> (Vec<PointSubmission>, usize) {
    let mut submissions = Vec::new();
    let mut malformed = 0;
    for body in bodies {
        match serde_json::from_str::<SubmissionBody>(body.as_ref()) {
            Ok(parsed) => submissions.extend(parsed.into_vec()),
            Err(e) => {
                log::warn!("Skipping malformed submission body: {}", e);
                malformed += 1;
            }
        }
    }
    (submissions, malformed)
}

/// Resolve the sender of a submission.
///
/// `Ok(None)` means the submission is dropped; validator outages propagate.
async fn authenticate(
    validator: &dyn TokenValidator,
    submission: PointSubmission,
) -> Result<Option<LotteryEntry>> {
    let Some(token) = submission.jwt.as_deref().filter(|t| !t.is_empty()) else {
        log::debug!("Submission for season {} has no token", submission.season);
        return Ok(None);
    };

    match validator.validate(token).await {
        Ok(user_name) => Ok(Some(submission.into_entry(user_name))),
        Err(AppError::Authentication(reason)) => {
            log::info!(
                "Dropping submission for season {}: {}",
                submission.season,
                reason
            );
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Record every authenticated submission of a batch in one upsert.
pub async fn process_batch<S: AsRef<str>>(
    store: &dyn LotteryStore,
    validator: &dyn TokenValidator,
    bodies: &[S],
) -> Result<BatchSummary> {
    let (submissions, malformed) = parse_batch(bodies);
    let submitted = submissions.len();

    let results = join_all(
        submissions
            .into_iter()
            .map(|submission| authenticate(validator, submission)),
    )
    .await;

    let mut rows = Vec::with_capacity(results.len());
    for result in results {
        if let Some(entry) = result? {
            rows.push(entry);
        }
    }

    store.upsert_entries(&rows).await?;

    let summary = BatchSummary {
        messages: bodies.len(),
        malformed,
        submissions: submitted,
        accepted: rows.len(),
    };
    log::info!(
        "Processed {} messages: {} submissions, {} accepted, {} dropped, {} malformed",
        summary.messages,
        summary.submissions,
        summary.accepted,
        summary.dropped(),
        summary.malformed
    );
    Ok(summary)
}

/// Record a single submission sent through the API.
pub async fn update_single(
    store: &dyn LotteryStore,
    validator: &dyn TokenValidator,
    body: &str,
) -> Result<SubmissionOutcome> {
    let submission = match serde_json::from_str::<PointSubmission>(body) {
        Ok(submission) => submission,
        Err(e) => {
            log::warn!("Malformed submission: {}", e);
            return Ok(SubmissionOutcome::Malformed);
        }
    };

    match authenticate(validator, submission).await? {
        Some(entry) => {
            store.upsert_entries(std::slice::from_ref(&entry)).await?;
            log::info!(
                "Recorded {} points for {} in season {}",
                entry.points,
                entry.user_name,
                entry.season
            );
            Ok(SubmissionOutcome::Accepted(entry))
        }
        None => Ok(SubmissionOutcome::Rejected),
    }
}
