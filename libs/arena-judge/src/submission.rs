// Wire types exchanged with the judge. None of these are ever persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One execution request: a source file run against one stdin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub language_id: u32,
    pub source_code: String,
    pub stdin: String,
    pub expected_output: String,
}

/// Opaque handle for one submitted request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionToken(pub String);

impl SubmissionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Comma-joined form the judge expects in batch queries
    pub fn join(tokens: &[SubmissionToken]) -> String {
        tokens
            .iter()
            .map(SubmissionToken::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for SubmissionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    pub id: u32,
    #[serde(default)]
    pub description: String,
}

/// Result of one submission as reported by the judge.
/// Only the status is consumed; output fields are kept for logging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResult {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub status_id: Option<u32>,
    #[serde(default)]
    pub status: Option<StatusInfo>,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
}

impl SubmissionResult {
    pub fn with_status(status_id: u32) -> Self {
        Self {
            status_id: Some(status_id),
            ..Default::default()
        }
    }

    /// Flat `status_id` when present, otherwise the nested `status.id`.
    pub fn status_id(&self) -> Option<u32> {
        self.status_id
            .or_else(|| self.status.as_ref().map(|status| status.id))
    }
}
