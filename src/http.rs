use anyhow::Context;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const MAX_ERROR_BODY: usize = 512;

/// Failure modes of a single GET. `Canceled` is only produced when the
/// caller's token fires.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP error! status: {status}")]
    Status { status: u16, body: String },
    #[error("malformed response body: {0}")]
    Parse(String),
    #[error("request canceled")]
    Canceled,
}

impl FetchError {
    pub fn is_canceled(&self) -> bool {
        matches!(self, FetchError::Canceled)
    }

    /// Banner text for a failed primary load of `what`.
    pub fn user_message(&self, what: &str) -> String {
        match self {
            FetchError::Timeout(_) => {
                "Request timeout. Please check your internet connection and try again.".to_string()
            }
            FetchError::Canceled => format!("Loading {what} was interrupted."),
            other => format!("Failed to load {what}: {other}. Please refresh the page."),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let user_agent = format!("cinescout/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5).min(timeout))
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, timeout })
    }

    /// GET `url` and decode the body as JSON.
    ///
    /// When `cancel` fires before the response is complete the request is
    /// dropped and `FetchError::Canceled` is returned.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, FetchError> {
        let text = match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!("Canceled request to {}", redact(url));
                        return Err(FetchError::Canceled);
                    }
                    res = self.get_text(url) => res?,
                }
            }
            None => self.get_text(url).await?,
        };
        serde_json::from_str(&text).map_err(|e| FetchError::Parse(e.to_string()))
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        let status = res.status();
        let text = res.text().await.map_err(|e| self.classify(e))?;
        if !status.is_success() {
            debug!("{} -> {}", redact(url), status);
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate(text, MAX_ERROR_BODY),
            });
        }
        Ok(text)
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else if err.is_decode() {
            FetchError::Parse(err.without_url().to_string())
        } else {
            FetchError::Network(err.without_url().to_string())
        }
    }
}

/// Strips the query string so credentials never reach the logs.
pub fn redact(url: &str) -> &str {
    url.split_once('?').map(|(path, _)| path).unwrap_or(url)
}

fn truncate(mut text: String, max: usize) -> String {
    if text.len() > max {
        let mut cut = max;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }
    text
}
