use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("invalid schema for {owner}: {message}")]
    Schema { owner: String, message: String },
    #[error("invalid duration {0:?}")]
    InvalidDuration(String),
    #[error("negative duration {0:?}")]
    NegativeDuration(String),
}

impl DomainError {
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    pub fn schema(owner: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            owner: owner.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
