//! HTTP fetching with proxy/user-agent rotation and fixed-delay retries.

mod user_agent;

pub use user_agent::DEFAULT_USER_AGENTS;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Proxy, StatusCode};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::rotation::{RotationChoice, RotationSource};
use crate::config::FetchSettings;

/// Failure of a single request attempt. Every variant is retryable.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("invalid proxy '{proxy}': {source}")]
    Proxy {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(StatusCode),
    #[error("{0}")]
    Other(String),
}

/// Terminal fetch failure.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("URL must not be empty")]
    EmptyUrl,
    #[error("giving up on {url} after {attempts} attempt(s): {last_error}")]
    Exhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },
}

/// Performs one GET attempt with the given rotation choice.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn get_text(&self, url: &str, choice: &RotationChoice) -> Result<String, AttemptError>;
}

/// reqwest-backed page source.
///
/// Proxies are bound to a reqwest `Client`, so a client is built per attempt.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    timeout: Duration,
}

impl HttpPageSource {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn build_client(&self, choice: &RotationChoice) -> Result<Client, AttemptError> {
        let mut builder = Client::builder()
            .user_agent(&choice.user_agent)
            .timeout(self.timeout)
            .gzip(true)
            .brotli(true);

        // No proxy means a direct connection, ignoring HTTP_PROXY and friends
        builder = match &choice.proxy {
            Some(proxy_url) => {
                let proxy = Proxy::all(proxy_url).map_err(|source| AttemptError::Proxy {
                    proxy: proxy_url.clone(),
                    source,
                })?;
                builder.proxy(proxy)
            }
            None => builder.no_proxy(),
        };

        builder.build().map_err(AttemptError::Client)
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn get_text(&self, url: &str, choice: &RotationChoice) -> Result<String, AttemptError> {
        let client = self.build_client(choice)?;
        let response = client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status(status));
        }

        Ok(response.text().await?)
    }
}

/// Fetches a page, retrying transient failures with a fixed delay.
#[derive(Clone)]
pub struct Fetcher {
    source: Arc<dyn PageSource>,
    rotation: Arc<dyn RotationSource>,
    retry_delay: Duration,
}

impl Fetcher {
    pub fn new(
        source: Arc<dyn PageSource>,
        rotation: Arc<dyn RotationSource>,
        retry_delay: Duration,
    ) -> Self {
        Self {
            source,
            rotation,
            retry_delay,
        }
    }

    /// Create an HTTP fetcher with timeout and delay taken from settings.
    pub fn http(settings: &FetchSettings, rotation: Arc<dyn RotationSource>) -> Self {
        Self::new(
            Arc::new(HttpPageSource::new(settings.timeout())),
            rotation,
            settings.retry_delay(),
        )
    }

    /// Fetch `url`, making at most `max_retries` attempts in total.
    ///
    /// Each attempt draws a fresh proxy and user agent. Failed attempts are
    /// followed by the fixed retry delay, except the last one.
    pub async fn fetch(&self, url: &str, max_retries: u32) -> Result<String, FetchError> {
        if url.trim().is_empty() {
            error!("Refusing to fetch an empty URL");
            return Err(FetchError::EmptyUrl);
        }

        let mut last_error = String::from("no attempts were made");

        for attempt in 1..=max_retries {
            let choice = self.rotation.next_choice();
            debug!(
                "Fetching {} (attempt {}/{}) via {} as {}",
                url,
                attempt,
                max_retries,
                choice.proxy.as_deref().unwrap_or("direct"),
                choice.user_agent
            );

            let start = Instant::now();
            match self.source.get_text(url, &choice).await {
                Ok(body) => {
                    info!(
                        "Fetched page {} (attempt {}/{}, {} bytes in {:?})",
                        url,
                        attempt,
                        max_retries,
                        body.len(),
                        start.elapsed()
                    );
                    return Ok(body);
                }
                Err(e) => {
                    error!(
                        "Error fetching page {} (attempt {}/{}): {}",
                        url, attempt, max_retries, e
                    );
                    last_error = e.to_string();
                    if attempt < max_retries {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        warn!(
            "Giving up on {} after {} attempt(s): {}",
            url, max_retries, last_error
        );
        Err(FetchError::Exhausted {
            url: url.to_string(),
            attempts: max_retries,
            last_error,
        })
    }
}
