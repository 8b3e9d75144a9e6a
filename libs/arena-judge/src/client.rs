/// Batch Submission Client
///
/// **Core Responsibility:**
/// Move submission requests to the judge and statuses back, nothing more.
///
/// **Contract:**
/// - `submit_batch` returns one token per request, in request order
/// - `fetch_batch` returns one result per token, in token order
/// - Transport failures surface as `JudgeError::Transport`; they never
///   masquerade as a content verdict
///
/// `Judge` is the seam: the authoring service and the tests only see the trait.

use crate::config::JudgeConfig;
use crate::error::JudgeError;
use crate::submission::{SubmissionRequest, SubmissionResult, SubmissionToken};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const SUBMIT_ENDPOINT: &str = "submissions/batch";
const FETCH_FIELDS: &str = "token,status_id,stdout,stderr,compile_output,time,memory";

#[async_trait]
pub trait Judge: Send + Sync {
    async fn submit_batch(
        &self,
        requests: &[SubmissionRequest],
    ) -> Result<Vec<SubmissionToken>, JudgeError>;

    async fn fetch_batch(
        &self,
        tokens: &[SubmissionToken],
    ) -> Result<Vec<SubmissionResult>, JudgeError>;
}

#[derive(Serialize)]
struct SubmitBody<'a> {
    submissions: &'a [SubmissionRequest],
}

#[derive(Deserialize)]
struct TokenEntry {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Deserialize)]
struct FetchBody {
    submissions: Vec<Option<SubmissionResult>>,
}

/// HTTP client for Judge0-compatible batch endpoints
#[derive(Debug, Clone)]
pub struct Judge0Client {
    http: Client,
    base_url: String,
    max_batch_size: usize,
    transport_retries: u32,
    retry_backoff: Duration,
}

/// Which failures a request may be repeated after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Retry {
    /// Reads: any timeout, connect failure, 429 or 5xx.
    Idempotent,
    /// Creates submissions: only failures where the judge cannot have
    /// accepted the batch (connect errors, 429, 503).
    Unsent,
}

impl Retry {
    fn on_status(self, status: StatusCode) -> bool {
        match self {
            Retry::Idempotent => {
                status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            Retry::Unsent => {
                status == StatusCode::TOO_MANY_REQUESTS
                    || status == StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }

    fn on_error(self, error: &reqwest::Error) -> bool {
        match self {
            Retry::Idempotent => error.is_timeout() || error.is_connect() || error.is_request(),
            Retry::Unsent => error.is_connect(),
        }
    }
}

impl Judge0Client {
    pub fn new(config: &JudgeConfig) -> Result<Self, JudgeError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|_| JudgeError::Config("api key is not a valid header value".to_string()))?;
            headers.insert("X-RapidAPI-Key", value);
        }
        if let Some(host) = &config.api_host {
            let value = HeaderValue::from_str(host)
                .map_err(|_| JudgeError::Config("api host is not a valid header value".to_string()))?;
            headers.insert("X-RapidAPI-Host", value);
        }

        let http = Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| JudgeError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_batch_size: config.max_batch_size.max(1),
            transport_retries: config.transport_retries,
            retry_backoff: config.retry_backoff,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request, retrying transient failures with linear backoff.
    /// Client errors (4xx other than 429) and undecodable bodies are final.
    async fn send<T, F>(&self, endpoint: &str, retry: Retry, build: F) -> Result<T, JudgeError>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            let (retryable, message) = match build().send().await {
                Ok(response) if response.status().is_success() => {
                    return response
                        .json::<T>()
                        .await
                        .map_err(|e| JudgeError::bad_response(endpoint, e.to_string()));
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    (retry.on_status(status), format!("HTTP {}: {}", status, truncate(&body, 200)))
                }
                Err(e) => (retry.on_error(&e), e.to_string()),
            };

            if !retryable || attempt > self.transport_retries {
                return Err(JudgeError::Transport {
                    endpoint: endpoint.to_string(),
                    message,
                });
            }

            let backoff = self.retry_backoff * attempt;
            warn!(
                endpoint,
                attempt,
                backoff_ms = backoff.as_millis() as u64,
                error = %message,
                "Judge request failed, retrying"
            );
            tokio::time::sleep(backoff).await;
        }
    }
}

#[async_trait]
impl Judge for Judge0Client {
    async fn submit_batch(
        &self,
        requests: &[SubmissionRequest],
    ) -> Result<Vec<SubmissionToken>, JudgeError> {
        let url = self.url(SUBMIT_ENDPOINT);
        let mut tokens = Vec::with_capacity(requests.len());

        for chunk in requests.chunks(self.max_batch_size) {
            let entries: Vec<TokenEntry> = self
                .send(SUBMIT_ENDPOINT, Retry::Unsent, || {
                    self.http
                        .post(&url)
                        .query(&[("base64_encoded", "false")])
                        .json(&SubmitBody { submissions: chunk })
                })
                .await?;

            if entries.len() != chunk.len() {
                return Err(JudgeError::bad_response(
                    SUBMIT_ENDPOINT,
                    format!("{} tokens for {} submissions", entries.len(), chunk.len()),
                ));
            }

            for (index, entry) in entries.into_iter().enumerate() {
                let token = entry.token.ok_or_else(|| {
                    JudgeError::bad_response(
                        SUBMIT_ENDPOINT,
                        format!("submission {} was refused", tokens.len() + index),
                    )
                })?;
                tokens.push(SubmissionToken(token));
            }
            debug!(chunk = chunk.len(), submitted = tokens.len(), "Submitted chunk");
        }

        Ok(tokens)
    }

    async fn fetch_batch(
        &self,
        tokens: &[SubmissionToken],
    ) -> Result<Vec<SubmissionResult>, JudgeError> {
        let url = self.url(SUBMIT_ENDPOINT);
        let mut results = Vec::with_capacity(tokens.len());

        for chunk in tokens.chunks(self.max_batch_size) {
            let joined = SubmissionToken::join(chunk);
            let body: FetchBody = self
                .send(SUBMIT_ENDPOINT, Retry::Idempotent, || {
                    self.http.get(&url).query(&[
                        ("tokens", joined.as_str()),
                        ("base64_encoded", "false"),
                        ("fields", FETCH_FIELDS),
                    ])
                })
                .await?;

            if body.submissions.len() != chunk.len() {
                return Err(JudgeError::bad_response(
                    SUBMIT_ENDPOINT,
                    format!("{} results for {} tokens", body.submissions.len(), chunk.len()),
                ));
            }

            for (token, result) in chunk.iter().zip(body.submissions) {
                let result = result.ok_or_else(|| {
                    JudgeError::bad_response(SUBMIT_ENDPOINT, format!("unknown token {}", token))
                })?;
                results.push(result);
            }
        }

        Ok(results)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        text.chars().take(max_chars).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
