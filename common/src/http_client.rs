use crate::errors::AppError;
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// HTTP client with a bounded per-request timeout and optional retries
pub struct HttpClient {
    client: Client,
    max_retries: u32,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration, max_retries: u32) -> Result<Self, AppError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            max_retries,
            timeout,
        })
    }

    /// Fetch a JSON body and deserialize it into `T`
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_json<T>(&self, url: &str) -> Result<T, AppError>
    where
        T: serde::de::DeserializeOwned,
    {
        let text = self.get_text(url).await?;
        let json: T = serde_json::from_str(&text)?;
        Ok(json)
    }

    /// Fetch a plain-text body, retrying with exponential backoff when configured
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_text(&self, url: &str) -> Result<String, AppError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            match self.fetch_with_timeout(url).await {
                Ok(body) => {
                    info!(url = %url, attempt = attempt + 1, "Request successful");
                    return Ok(body);
                }
                Err(e) => {
                    warn!(url = %url, attempt = attempt + 1, error = %e, "Request failed");
                    last_error = Some(e);
                    if attempt < self.max_retries {
                        let backoff = Duration::from_millis(2_u64.pow(attempt) * 100);
                        warn!(
                            url = %url,
                            backoff_ms = backoff.as_millis(),
                            "Retrying with exponential backoff"
                        );
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
        }

        if self.max_retries > 0 {
            error!(
                url = %url,
                attempts = self.max_retries + 1,
                "All retry attempts exhausted"
            );
        }
        Err(last_error.unwrap_or_else(|| AppError::internal("Unknown error after retries")))
    }

    async fn fetch_with_timeout(&self, url: &str) -> Result<String, AppError> {
        let response = tokio::time::timeout(self.timeout, self.client.get(url).send())
            .await
            .map_err(|_| AppError::timeout(format!("Request to {} timed out", url)))?
            .map_err(|e| classify(e, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::http(
                status.as_u16(),
                format!("HTTP error: {}", status),
            ));
        }

        response.text().await.map_err(|e| classify(e, url))
    }
}

fn classify(e: reqwest::Error, url: &str) -> AppError {
    if e.is_timeout() {
        AppError::timeout(format!("Request to {} timed out", url))
    } else {
        AppError::NetworkError(e)
    }
}
