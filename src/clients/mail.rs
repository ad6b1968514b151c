//! Outbound mail for the winner report.

use async_trait::async_trait;

use crate::error::Result;
use crate::services::Email;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<()>;
}

/// Writes the message to the log instead of sending it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &Email) -> Result<()> {
        log::info!(
            "Mail to {} from {}: {}\n{}",
            email.to.join(", "),
            email.from,
            email.subject,
            email.body
        );
        Ok(())
    }
}

#[cfg(feature = "ses")]
pub use ses::SesMailer;

#[cfg(feature = "ses")]
mod ses {
    use async_trait::async_trait;
    use aws_sdk_sesv2::Client;
    use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};

    use super::Mailer;
    use crate::error::{AppError, Result};
    use crate::services::Email;

    /// Mailer backed by SES (v2 API).
    pub struct SesMailer {
        client: Client,
    }

    impl SesMailer {
        pub fn new(client: Client) -> Self {
            Self { client }
        }

        pub async fn from_env() -> Self {
            let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            Self::new(Client::new(&config))
        }
    }

    fn utf8(data: &str) -> Result<Content> {
        Content::builder()
            .data(data)
            .charset("UTF-8")
            .build()
            .map_err(AppError::mail)
    }

    #[async_trait]
    impl Mailer for SesMailer {
        async fn send(&self, email: &Email) -> Result<()> {
            let message = Message::builder()
                .subject(utf8(&email.subject)?)
                .body(Body::builder().text(utf8(&email.body)?).build())
                .build()
                .map_err(AppError::mail)?;

            let destination = Destination::builder()
                .set_to_addresses(Some(email.to.clone()))
                .build();

            let output = self
                .client
                .send_email()
                .from_email_address(&email.from)
                .destination(destination)
                .set_reply_to_addresses(Some(email.reply_to.clone()))
                .content(EmailContent::builder().simple(message).build())
                .send()
                .await
                .map_err(AppError::mail)?;

            log::info!(
                "Sent '{}' to {} recipient(s), message id {:?}",
                email.subject,
                email.to.len(),
                output.message_id()
            );
            Ok(())
        }
    }
}
