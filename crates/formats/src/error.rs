use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("malformed JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("schedule document must be a JSON object")]
    NotAnObject,
    #[error("schedule document has no \"items\" array")]
    MissingItems,
    #[error("category {0:?} is not registered")]
    UnknownCategory(String),
    #[error("unknown schedule format {0:?}")]
    UnknownFormat(String),
    #[error("row {index} cannot be written as text: {message}")]
    Unrepresentable { index: usize, message: String },
}
