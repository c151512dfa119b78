//! Line-oriented schedule DSL.
//!
//! ```text
//! # Warmup
//! 5:00, Chromatic exercise
//! ## Chords
//! 10:00, Changes, Chord Progression, C, I, V, vi, @BPM:90
//! ```
//!
//! Fields are split on commas without any quoting or escaping, so argument
//! values cannot contain commas. The duration is kept verbatim as long as it
//! is a single token; checking it is left to the schedule builder.
//!
//! Rows the grammar cannot express faithfully are refused by
//! [`TextCodec`]'s `serialize` rather than written lossily.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};
use woodshed_domain::{
    GroupRow, IntervalRow, IntervalSettings, ScheduleDocument, ScheduleRow, DEFAULT_DURATION,
};
use woodshed_features::{Category, FeatureRegistry};

use crate::{FormatError, ParseReport, ParseWarning, Position, ScheduleCodec, ScheduleFormat};

static GROUP_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(#+)\s*(.*?)\s*$").expect("valid group line regex"));
static INTERVAL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([^,#\s][^,\s]*)?\s*(?:,(.*))?$").expect("valid interval line regex")
});
static SETTINGS_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@([A-Za-z][A-Za-z0-9_]*\s*:.*)$").expect("valid settings literal regex")
});

const CATEGORY_SEPARATOR: char = '/';

pub struct TextCodec<'a> {
    registry: &'a FeatureRegistry,
    default_category: &'a Category,
}

impl<'a> TextCodec<'a> {
    pub fn new(registry: &'a FeatureRegistry, default_category: &str) -> Result<Self, FormatError> {
        let default_category = registry
            .category(default_category)
            .ok_or_else(|| FormatError::UnknownCategory(default_category.to_string()))?;
        Ok(Self {
            registry,
            default_category,
        })
    }

    fn parse_line(
        &self,
        line: &str,
        notes: &mut Vec<String>,
    ) -> Result<Option<ScheduleRow>, String> {
        if line.trim().is_empty() {
            return Ok(None);
        }
        if let Some(caps) = GROUP_LINE.captures(line) {
            let level = caps[1].len() as u32;
            let row = GroupRow::new(level, &caps[2]).map_err(|err| err.to_string())?;
            return Ok(Some(ScheduleRow::Group(row)));
        }
        let caps = INTERVAL_LINE
            .captures(line)
            .ok_or_else(|| format!("unrecognized line {:?}", line.trim()))?;
        let duration = caps
            .get(1)
            .map(|m| m.as_str())
            .filter(|text| !text.is_empty())
            .unwrap_or(DEFAULT_DURATION);
        let mut fields: Vec<String> = caps
            .get(2)
            .map(|m| m.as_str().split(',').map(|f| f.trim().to_string()).collect())
            .unwrap_or_default();

        let mut settings: Option<Box<dyn IntervalSettings>> = None;
        let literal = fields
            .last()
            .and_then(|last| SETTINGS_LITERAL.captures(last))
            .map(|literal| literal[1].to_string());
        if let Some(literal) = literal {
            let feature_field = if fields.len() > 2 { fields[1].as_str() } else { "" };
            let (category, _) = self.resolve_feature(feature_field);
            match category.parse_literal(&literal) {
                Some(Ok(parsed)) => {
                    fields.pop();
                    settings = Some(parsed);
                }
                Some(Err(err)) => {
                    fields.pop();
                    notes.push(format!("ignoring settings @{literal}: {err}"));
                }
                None => {
                    debug!(%literal, category = category.name(), "not a settings literal");
                }
            }
        }

        let mut fields = fields.into_iter();
        let task = fields.next().unwrap_or_default();
        let feature_field = fields.next().unwrap_or_default();
        let args: Vec<String> = fields.collect();
        let (category, feature_type) = self.resolve_feature(&feature_field);

        let mut row = IntervalRow::new(settings.unwrap_or_else(|| category.create_settings()))
            .with_duration(duration)
            .with_task(task)
            .with_feature(feature_type, args);
        row.category_name = category.name().to_string();
        Ok(Some(ScheduleRow::Interval(row)))
    }

    /// Resolves the feature field to a category and a feature type name.
    fn resolve_feature(&self, field: &str) -> (&'a Category, String) {
        if field.is_empty() {
            return (self.default_category, String::new());
        }
        if let Some((category, type_name)) = field.split_once(CATEGORY_SEPARATOR) {
            if let Some(category) = self.registry.category(category.trim()) {
                return (category, type_name.trim().to_string());
            }
        }
        if self.default_category.feature_type(field).is_some() {
            return (self.default_category, field.to_string());
        }
        if let Some(descriptor) = self.registry.find_feature_type(field) {
            if let Some(category) = self.registry.category(&descriptor.category) {
                return (category, field.to_string());
            }
        }
        debug!(feature_type = field, "feature type is not registered");
        (self.default_category, field.to_string())
    }

    fn feature_field(&self, row: &IntervalRow) -> String {
        if row.category_name.is_empty() || row.category_name == self.default_category.name() {
            row.feature_type_name.clone()
        } else {
            format!(
                "{}{CATEGORY_SEPARATOR}{}",
                row.category_name, row.feature_type_name
            )
        }
    }

    fn write_interval(&self, index: usize, row: &IntervalRow) -> Result<String, FormatError> {
        let unrepresentable = |message: String| FormatError::Unrepresentable { index, message };
        if row.duration.starts_with('#')
            || row.duration.contains(',')
            || row.duration.chars().any(char::is_whitespace)
        {
            return Err(unrepresentable(format!(
                "duration {:?} is not a single token",
                row.duration
            )));
        }
        let feature_field = self.feature_field(row);
        let mut fields = vec![row.task.clone()];
        if !feature_field.is_empty() || !row.args.is_empty() {
            fields.push(feature_field);
            fields.extend(row.args.iter().cloned());
        }
        if let Some(field) = fields.iter().find(|field| field.contains(',')) {
            return Err(unrepresentable(format!("field {field:?} contains a comma")));
        }
        match row.settings.literal() {
            Some(literal) => fields.push(format!("@{literal}")),
            None => {
                if let Some(literal) = self.literal_collision(&fields) {
                    return Err(unrepresentable(format!(
                        "trailing field @{literal} would be read back as settings"
                    )));
                }
            }
        }
        if fields.len() == 1 && fields[0].is_empty() {
            fields.clear();
        }
        let mut line = row.duration.clone();
        for field in fields {
            line.push_str(", ");
            line.push_str(&field);
        }
        Ok(line.trim_end().to_string())
    }

    /// The trailing field, when parsing would take it for a settings literal.
    fn literal_collision(&self, fields: &[String]) -> Option<String> {
        let literal = SETTINGS_LITERAL.captures(fields.last()?.trim())?[1].to_string();
        let feature_field = if fields.len() > 2 { fields[1].as_str() } else { "" };
        let (category, _) = self.resolve_feature(feature_field);
        category.parse_literal(&literal).map(|_| literal)
    }
}

impl ScheduleCodec for TextCodec<'_> {
    fn format(&self) -> ScheduleFormat {
        ScheduleFormat::Text
    }

    fn parse(&self, input: &str) -> Result<ParseReport, FormatError> {
        let mut document = ScheduleDocument::default();
        let mut warnings = Vec::new();
        let mut notes = Vec::new();
        for (index, line) in input.lines().enumerate() {
            let position = Position::Line(index + 1);
            match self.parse_line(line, &mut notes) {
                Ok(Some(row)) => document.push(row),
                Ok(None) => {}
                Err(message) => {
                    warn!(%position, %message, "skipping schedule line");
                    warnings.push(ParseWarning { position, message });
                }
            }
            for message in notes.drain(..) {
                warn!(%position, %message, "schedule line partially ignored");
                warnings.push(ParseWarning { position, message });
            }
        }
        Ok(ParseReport { document, warnings })
    }

    fn serialize(&self, document: &ScheduleDocument) -> Result<String, FormatError> {
        let mut out = String::new();
        for (index, row) in document.items.iter().enumerate() {
            match row {
                ScheduleRow::Group(group) => {
                    out.push_str(&"#".repeat(group.level as usize));
                    if !group.name.is_empty() {
                        out.push(' ');
                        out.push_str(&group.name);
                    }
                }
                ScheduleRow::Interval(interval) => {
                    out.push_str(&self.write_interval(index, interval)?)
                }
            }
            out.push('\n');
        }
        Ok(out)
    }
}
