use thiserror::Error;
use uuid::Uuid;

/// Why an authoring payload was refused before it ever reached the judge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0}")]
    Malformed(String),

    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
}

impl ValidationError {
    pub fn malformed(message: impl Into<String>) -> Self {
        ValidationError::Malformed(message.into())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("problem {0} kept changing during update")]
    Conflict(Uuid),
}
