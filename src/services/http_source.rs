use std::time::Duration;

use async_trait::async_trait;
use rand::{thread_rng, Rng};
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::error::{PackError, Result};
use crate::model::entry::RawEntry;
use crate::parsers::langpack;

use super::registry::{PackChunk, PackSource};

const BASE_DELAY_MS: u64 = 500;
const MAX_BACKOFF_EXP: u32 = 6;

fn backoff(attempt: usize) -> Duration {
    let jitter: u64 = thread_rng().gen_range(0..200);
    let exp = u32::try_from(attempt).unwrap_or(u32::MAX).min(MAX_BACKOFF_EXP);
    let ms = BASE_DELAY_MS
        .saturating_mul(2_u64.saturating_pow(exp))
        .saturating_add(jitter);
    Duration::from_millis(ms)
}

fn should_retry_http(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

fn error_snippet(status: StatusCode, body_text: &str) -> String {
    let trimmed = body_text.trim();
    let snippet: String = if trimmed.chars().count() > 200 {
        format!("{}...", trimmed.chars().take(200).collect::<String>())
    } else {
        trimmed.to_string()
    };
    format!("HTTP {}: {}", status.as_u16(), snippet)
}

/// Fetches chunks from `{base_url}/{chunk path}`.
pub struct HttpPackSource {
    client: Client,
    base_url: String,
    max_attempts: usize,
}

impl HttpPackSource {
    /// `max_attempts` counts every request for a chunk, the first included;
    /// zero is treated as one.
    pub fn new(base_url: &str, timeout_secs: u64, max_attempts: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PackError::Http {
                url: base_url.to_string(),
                message: e.to_string(),
            })?;

        Ok(HttpPackSource {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_attempts: max_attempts.max(1),
        })
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn url_for(&self, chunk: &PackChunk) -> String {
        format!("{}/{}", self.base_url, chunk.relative_path())
    }
}

#[async_trait]
impl PackSource for HttpPackSource {
    async fn fetch(&self, chunk: &PackChunk) -> Result<Vec<RawEntry>> {
        let url = self.url_for(chunk);
        let mut last_err = String::new();

        for attempt in 0..self.max_attempts {
            let retry_left = attempt + 1 < self.max_attempts;

            let resp = match self.client.get(&url).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_err = e.to_string();
                    if retry_left {
                        tokio::time::sleep(backoff(attempt)).await;
                    }
                    continue;
                }
            };

            let status = resp.status();
            if status == StatusCode::NOT_FOUND {
                return Err(PackError::NotFound(url));
            }

            if !status.is_success() {
                last_err = error_snippet(status, &resp.text().await.unwrap_or_default());
                if should_retry_http(status) && retry_left {
                    debug!("{url}: {last_err}, retrying");
                    tokio::time::sleep(backoff(attempt)).await;
                    continue;
                }
                break;
            }

            match resp.bytes().await {
                Ok(bytes) => return langpack::decode_and_parse(&url, &bytes),
                Err(e) => {
                    last_err = e.to_string();
                    if retry_left {
                        tokio::time::sleep(backoff(attempt)).await;
                    }
                }
            }
        }

        Err(PackError::Http {
            url,
            message: last_err,
        })
    }
}
