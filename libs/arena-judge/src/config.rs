// Judge connection settings
// Built once by the binaries and handed to the client at construction time.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct JudgeConfig {
    /// Base URL of a Judge0-compatible API, e.g. http://localhost:2358
    pub base_url: String,
    /// Sent as X-RapidAPI-Key when set
    pub api_key: Option<String>,
    /// Sent as X-RapidAPI-Host when set
    pub api_host: Option<String>,
    /// Per HTTP request
    pub request_timeout: Duration,
    /// Largest batch the judge accepts in one call
    pub max_batch_size: usize,
    /// Extra attempts for transient transport failures
    pub transport_retries: u32,
    /// Backoff unit between transport attempts (grows linearly)
    pub retry_backoff: Duration,
    pub poll: PollPolicy,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:2358".to_string(),
            api_key: None,
            api_host: None,
            request_timeout: Duration::from_secs(10),
            max_batch_size: 20,
            transport_retries: 3,
            retry_backoff: Duration::from_millis(500),
            poll: PollPolicy::default(),
        }
    }
}

/// How long to wait for a submitted batch to reach terminal statuses.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Wait before the first fetch
    pub initial_delay: Duration,
    /// Added to the wait after every fetch that still has unfinished results
    pub delay_increment: Duration,
    pub max_delay: Duration,
    /// Hard bound on the whole wait
    pub deadline: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            delay_increment: Duration::from_millis(500),
            max_delay: Duration::from_secs(3),
            deadline: Duration::from_secs(60),
        }
    }
}
