//! Token validation.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Exchanges a client token for the user name it was issued to.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate(&self, token: &str) -> Result<String>;
}

#[derive(Serialize)]
struct ValidationRequest<'a> {
    token: &'a str,
}

#[derive(Deserialize)]
struct ValidationResponse {
    #[serde(default)]
    username: Option<String>,
}

/// Validator backed by a remote endpoint.
///
/// POSTs `{"token": ...}` and expects `{"username": ...}` back. Client
/// errors and answers without a user name reject the token; server errors,
/// timeouts and throttling are returned as [`AppError::Http`].
pub struct HttpTokenValidator {
    client: reqwest::Client,
    url: String,
}

impl HttpTokenValidator {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(AppError::config("auth.validation_url is not set"));
        }
        Ok(Self { client, url })
    }
}

#[async_trait]
impl TokenValidator for HttpTokenValidator {
    async fn validate(&self, token: &str) -> Result<String> {
        let body = serde_json::to_string(&ValidationRequest { token })?;
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if rejects_token(status) {
            return Err(AppError::authentication(format!(
                "validator answered {status}"
            )));
        }

        let text = response.error_for_status()?.text().await?;
        let parsed: ValidationResponse = serde_json::from_str(&text)
            .map_err(|e| AppError::authentication(format!("unreadable validator answer: {e}")))?;

        parsed
            .username
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| AppError::authentication("token carries no user name"))
    }
}

fn rejects_token(status: StatusCode) -> bool {
    status.is_client_error()
        && status != StatusCode::REQUEST_TIMEOUT
        && status != StatusCode::TOO_MANY_REQUESTS
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Serves one canned answer per connection, in order.
    async fn validator_answering(answers: &[(&'static str, &'static str)]) -> HttpTokenValidator {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/validate", listener.local_addr().unwrap());
        let answers = answers.to_vec();

        tokio::spawn(async move {
            for (status, body) in answers {
                let (mut socket, _) = listener.accept().await.unwrap();
                read_request(&mut socket).await;
                let reply = format!(
                    "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
        });

        HttpTokenValidator::new(reqwest::Client::new(), url).unwrap()
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            request.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&request).to_lowercase();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= end + 4 + length {
                    return;
                }
            }
            if n == 0 {
                return;
            }
        }
    }

    #[tokio::test]
    async fn accepted_token_yields_user_name() {
        let validator = validator_answering(&[("200 OK", r#"{"username": "alice"}"#)]).await;
        assert_eq!(validator.validate("tok").await.unwrap(), "alice");
    }

    #[tokio::test]
    async fn client_errors_reject_the_token() {
        let validator = validator_answering(&[
            ("401 Unauthorized", ""),
            ("403 Forbidden", ""),
            ("200 OK", "{}"),
        ])
        .await;

        for _ in 0..3 {
            let err = validator.validate("tok").await.unwrap_err();
            assert!(matches!(err, AppError::Authentication(_)), "{err}");
        }
    }

    #[tokio::test]
    async fn validator_outages_are_not_rejections() {
        let validator = validator_answering(&[
            ("503 Service Unavailable", ""),
            ("500 Internal Server Error", ""),
            ("429 Too Many Requests", ""),
        ])
        .await;

        for _ in 0..3 {
            let err = validator.validate("tok").await.unwrap_err();
            assert!(matches!(err, AppError::Http(_)), "{err}");
        }
    }

    #[test]
    fn only_client_errors_reject() {
        assert!(rejects_token(StatusCode::UNAUTHORIZED));
        assert!(rejects_token(StatusCode::BAD_REQUEST));
        assert!(!rejects_token(StatusCode::TOO_MANY_REQUESTS));
        assert!(!rejects_token(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!rejects_token(StatusCode::OK));
    }

    #[test]
    fn requires_endpoint() {
        let client = reqwest::Client::new();
        assert!(HttpTokenValidator::new(client.clone(), " ").is_err());
        assert!(HttpTokenValidator::new(client, "https://auth.example.com/validate").is_ok());
    }

    #[test]
    fn response_without_username_parses() {
        let parsed: ValidationResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.username.is_none());
    }
}
