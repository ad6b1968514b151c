//! Pipeline entry points for lottery operations.
//!
//! - `run_new_season`: Generate the next season and append it to the history
//! - `run_draw`: Pick winners for the season that just ended and mail them
//! - `process_batch`: Record queued point submissions
//! - `update_single`: Record one point submission from an API request

pub mod draw;
pub mod new_season;
pub mod submit;

use std::sync::Arc;

use crate::clients::{Mailer, NameCatalog};
use crate::models::Config;
use crate::storage::{ObjectStore, SeasonDocuments};
use crate::store::LotteryStore;

pub use draw::{DrawOutcome, DrawRequest, run_draw};
pub use new_season::{NewSeasonOutcome, NewSeasonRequest, run_new_season};
pub use submit::{BatchSummary, SubmissionOutcome, parse_batch, process_batch, update_single};

/// Collaborators shared by the scheduled pipelines.
#[derive(Clone)]
pub struct LotteryContext {
    pub config: Config,
    pub documents: SeasonDocuments,
    pub entries: Arc<dyn LotteryStore>,
    pub catalog: Arc<dyn NameCatalog>,
    pub mailer: Arc<dyn Mailer>,
}

impl LotteryContext {
    pub fn new(
        config: Config,
        objects: Arc<dyn ObjectStore>,
        entries: Arc<dyn LotteryStore>,
        catalog: Arc<dyn NameCatalog>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let documents = SeasonDocuments::new(objects, &config.storage);
        Self {
            config,
            documents,
            entries,
            catalog,
            mailer,
        }
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::clients::{Mailer, NameCatalog, TokenValidator};
    use crate::error::{AppError, Result};
    use crate::services::Email;

    pub struct FixedCatalog(pub Vec<String>);

    impl FixedCatalog {
        pub fn of(names: &[&str]) -> Self {
            Self(names.iter().map(|n| n.to_string()).collect())
        }
    }

    #[async_trait]
    impl NameCatalog for FixedCatalog {
        async fn collectible_names(&self) -> Result<Vec<String>> {
            Ok(self.0.clone())
        }
    }

    /// Records every message; fails when `broken` is set.
    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<Email>>,
        pub broken: bool,
    }

    impl RecordingMailer {
        pub fn sent(&self) -> Vec<Email> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: &Email) -> Result<()> {
            if self.broken {
                return Err(AppError::mail("relay refused the message"));
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    /// Maps known tokens to user names; anything else is rejected.
    pub struct TokenTable(pub HashMap<String, String>);

    impl TokenTable {
        pub fn of(pairs: &[(&str, &str)]) -> Self {
            Self(
                pairs
                    .iter()
                    .map(|(t, u)| (t.to_string(), u.to_string()))
                    .collect(),
            )
        }
    }

    #[async_trait]
    impl TokenValidator for TokenTable {
        async fn validate(&self, token: &str) -> Result<String> {
            self.0
                .get(token)
                .cloned()
                .ok_or_else(|| AppError::authentication("unknown token"))
        }
    }
}
