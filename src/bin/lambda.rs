//! AWS Lambda entry point for the lottery
//!
//! Deploy with `cargo lambda build --release --features lambda`.
//! Set `LOTTERY_HANDLER` to pick the function this deployment serves.

use lambda_runtime::{Error as LambdaError, service_fn};
use lottery::lambda::{self, HandlerKind};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let kind = HandlerKind::from_env()?;
    info!("Lottery Lambda starting as {}", kind);

    lambda_runtime::run(service_fn(move |event| lambda::handler(kind, event))).await
}
