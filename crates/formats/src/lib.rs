pub mod error;
pub mod json;
pub mod text;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use woodshed_domain::ScheduleDocument;
use woodshed_features::FeatureRegistry;

pub use crate::error::FormatError;
pub use crate::json::JsonCodec;
pub use crate::text::TextCodec;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleFormat {
    Text,
    Json,
}

impl ScheduleFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(ScheduleFormat::Json),
            "txt" | "sched" | "schedule" => Some(ScheduleFormat::Text),
            _ => None,
        }
    }

    /// Guesses the format from content: JSON documents are objects.
    pub fn detect(input: &str) -> Self {
        if input.trim_start().starts_with('{') {
            ScheduleFormat::Json
        } else {
            ScheduleFormat::Text
        }
    }

    pub fn other(self) -> Self {
        match self {
            ScheduleFormat::Text => ScheduleFormat::Json,
            ScheduleFormat::Json => ScheduleFormat::Text,
        }
    }
}

impl fmt::Display for ScheduleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScheduleFormat::Text => "text",
            ScheduleFormat::Json => "json",
        })
    }
}

impl FromStr for ScheduleFormat {
    type Err = FormatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ScheduleFormat::Text),
            "json" => Ok(ScheduleFormat::Json),
            other => Err(FormatError::UnknownFormat(other.to_string())),
        }
    }
}

/// Where a skipped piece of input came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position {
    /// One-based line number of a text document.
    Line(usize),
    /// Zero-based index into a JSON document's `items`.
    Item(usize),
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Line(line) => write!(f, "line {line}"),
            Position::Item(index) => write!(f, "item {index}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseWarning {
    pub position: Position,
    pub message: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.message)
    }
}

/// A parsed document plus the items that were skipped on the way.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseReport {
    pub document: ScheduleDocument,
    pub warnings: Vec<ParseWarning>,
}

impl ParseReport {
    pub fn into_document(self) -> ScheduleDocument {
        self.document
    }
}

pub trait ScheduleCodec {
    fn format(&self) -> ScheduleFormat;

    fn parse(&self, input: &str) -> Result<ParseReport, FormatError>;

    fn serialize(&self, document: &ScheduleDocument) -> Result<String, FormatError>;
}

/// Codec for `format`. The text DSL resolves feature types against
/// `default_category` first.
pub fn codec_for<'a>(
    format: ScheduleFormat,
    registry: &'a FeatureRegistry,
    default_category: &str,
) -> Result<Box<dyn ScheduleCodec + 'a>, FormatError> {
    Ok(match format {
        ScheduleFormat::Text => Box::new(TextCodec::new(registry, default_category)?),
        ScheduleFormat::Json => Box::new(JsonCodec::new(registry)),
    })
}

/// Parses `input` with one codec and serializes the result with another.
pub fn convert(
    input: &str,
    from: ScheduleFormat,
    to: ScheduleFormat,
    registry: &FeatureRegistry,
    default_category: &str,
) -> Result<(String, Vec<ParseWarning>), FormatError> {
    let report = codec_for(from, registry, default_category)?.parse(input)?;
    let output = codec_for(to, registry, default_category)?.serialize(&report.document)?;
    Ok((output, report.warnings))
}
