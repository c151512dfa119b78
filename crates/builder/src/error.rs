use thiserror::Error;
use time::Duration;
use woodshed_domain::format_duration;
use woodshed_features::CodecError;

/// Why a schedule could not be built. Every interval error names the row
/// index and label of the offending interval.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{label} (row {index}): invalid duration {value:?}")]
    InvalidDuration {
        index: usize,
        label: String,
        value: String,
    },
    #[error("{label} (row {index}): negative duration {value:?}")]
    NegativeDuration {
        index: usize,
        label: String,
        value: String,
    },
    #[error(
        "{label} (row {index}): total duration {} exceeds the limit of {}",
        format_duration(*total),
        format_duration(*limit)
    )]
    TotalDurationExceeded {
        index: usize,
        label: String,
        total: Duration,
        limit: Duration,
    },
    #[error("{label} (row {index}): unknown category {category:?}")]
    UnknownCategory {
        index: usize,
        label: String,
        category: String,
    },
    #[error("{label} (row {index}): unknown feature type {feature_type:?} in {category}")]
    UnknownFeatureType {
        index: usize,
        label: String,
        category: String,
        feature_type: String,
    },
    #[error("{label} (row {index}): {source}")]
    ArgumentMismatch {
        index: usize,
        label: String,
        #[source]
        source: CodecError,
    },
    #[error("{label} (row {index}): {message}")]
    Feature {
        index: usize,
        label: String,
        message: String,
    },
}

impl BuildError {
    /// Row index of the interval that failed.
    pub fn index(&self) -> usize {
        match self {
            BuildError::InvalidDuration { index, .. }
            | BuildError::NegativeDuration { index, .. }
            | BuildError::TotalDurationExceeded { index, .. }
            | BuildError::UnknownCategory { index, .. }
            | BuildError::UnknownFeatureType { index, .. }
            | BuildError::ArgumentMismatch { index, .. }
            | BuildError::Feature { index, .. } => *index,
        }
    }
}
