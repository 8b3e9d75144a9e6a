// API configuration
// Read once from the environment at startup, before logging is up.
// Nothing below main touches env vars.

use anyhow::{anyhow, Context, Result};
use arena_common::validate::DuplicateTagPolicy;
use arena_judge::JudgeConfig;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    /// In-memory catalog when unset
    pub redis_url: Option<String>,
    pub judge: JudgeConfig,
    /// Judge0 CE ids when unset
    pub languages_file: Option<PathBuf>,
    pub duplicate_tags: DuplicateTagPolicy,
    /// Emit JSON log lines
    pub json_logs: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            redis_url: None,
            judge: JudgeConfig::default(),
            languages_file: None,
            duplicate_tags: DuplicateTagPolicy::default(),
            json_logs: false,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = ApiConfig::default();

        if let Some(addr) = var("ARENA_BIND_ADDR") {
            config.bind_addr = addr;
        }
        config.redis_url = var("REDIS_URL");
        config.languages_file = var("LANGUAGES_FILE").map(PathBuf::from);
        config.json_logs = var("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json"));

        if let Some(policy) = var("DUPLICATE_TAGS") {
            config.duplicate_tags = DuplicateTagPolicy::from_str(&policy)
                .map_err(|e| anyhow!(e))
                .context("Invalid DUPLICATE_TAGS")?;
        }

        if let Some(url) = var("JUDGE_URL") {
            config.judge.base_url = url;
        }
        config.judge.api_key = var("JUDGE_API_KEY");
        config.judge.api_host = var("JUDGE_API_HOST");

        if let Some(size) = var("JUDGE_MAX_BATCH") {
            config.judge.max_batch_size = size
                .parse::<usize>()
                .context("Invalid JUDGE_MAX_BATCH")?;
        }
        if let Some(secs) = var("JUDGE_POLL_DEADLINE_SECS") {
            let secs = secs
                .parse::<u64>()
                .context("Invalid JUDGE_POLL_DEADLINE_SECS")?;
            config.judge.poll.deadline = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ApiConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert!(config.redis_url.is_none());
        assert_eq!(config.judge.base_url, "http://localhost:2358");
        assert_eq!(config.judge.max_batch_size, 20);
        assert_eq!(config.duplicate_tags, DuplicateTagPolicy::Deduplicate);
        assert!(!config.json_logs);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("ARENA_BIND_ADDR", "127.0.0.1:8080"),
            ("REDIS_URL", "redis://cache:6379"),
            ("JUDGE_URL", "https://judge0-ce.p.rapidapi.com"),
            ("JUDGE_API_KEY", "key"),
            ("JUDGE_MAX_BATCH", "10"),
            ("JUDGE_POLL_DEADLINE_SECS", "90"),
            ("DUPLICATE_TAGS", "reject"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.redis_url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(config.judge.api_key.as_deref(), Some("key"));
        assert_eq!(config.judge.max_batch_size, 10);
        assert_eq!(config.judge.poll.deadline, Duration::from_secs(90));
        assert_eq!(config.duplicate_tags, DuplicateTagPolicy::Reject);
        assert!(config.json_logs);
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = load(&[("REDIS_URL", "  "), ("JUDGE_API_KEY", "")]).unwrap();
        assert!(config.redis_url.is_none());
        assert!(config.judge.api_key.is_none());
    }

    #[test]
    fn test_invalid_numbers_are_errors() {
        assert!(load(&[("JUDGE_MAX_BATCH", "lots")]).is_err());
        assert!(load(&[("DUPLICATE_TAGS", "maybe")]).is_err());
    }
}
