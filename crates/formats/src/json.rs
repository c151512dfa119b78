use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use woodshed_domain::{GroupRow, IntervalRow, ScheduleDocument, ScheduleRow, DEFAULT_DURATION};
use woodshed_features::FeatureRegistry;

use crate::{FormatError, ParseReport, ParseWarning, Position, ScheduleCodec, ScheduleFormat};

#[derive(Debug, Serialize)]
struct DocumentJson<'a> {
    name: &'a str,
    items: Vec<ItemJson>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "rowType", rename_all = "lowercase")]
enum ItemJson {
    Group {
        level: u32,
        #[serde(default)]
        name: String,
    },
    Interval(IntervalJson),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntervalJson {
    #[serde(default = "default_duration")]
    duration: String,
    #[serde(default)]
    task: String,
    category_name: String,
    #[serde(default)]
    feature_type_name: String,
    #[serde(default)]
    feature_args_list: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    interval_settings: Option<Value>,
}

fn default_duration() -> String {
    DEFAULT_DURATION.to_string()
}

pub struct JsonCodec<'a> {
    registry: &'a FeatureRegistry,
}

impl<'a> JsonCodec<'a> {
    pub fn new(registry: &'a FeatureRegistry) -> Self {
        Self { registry }
    }

    fn parse_item(&self, item: &Value, notes: &mut Vec<String>) -> Result<ScheduleRow, String> {
        let item: ItemJson = serde_json::from_value(item.clone())
            .map_err(|err| format!("malformed item: {err}"))?;
        match item {
            ItemJson::Group { level, name } => GroupRow::new(level, name)
                .map(ScheduleRow::Group)
                .map_err(|err| err.to_string()),
            ItemJson::Interval(interval) => {
                let category = self
                    .registry
                    .category(&interval.category_name)
                    .ok_or_else(|| {
                        format!("unregistered category {:?}", interval.category_name)
                    })?;
                let settings = match &interval.interval_settings {
                    None | Some(Value::Null) => category.create_settings(),
                    Some(json) => category.parse_settings(json).unwrap_or_else(|err| {
                        notes.push(format!("using default settings: {err}"));
                        category.create_settings()
                    }),
                };
                let mut row = IntervalRow::new(settings)
                    .with_duration(interval.duration)
                    .with_task(interval.task)
                    .with_feature(interval.feature_type_name, interval.feature_args_list);
                row.category_name = category.name().to_string();
                Ok(ScheduleRow::Interval(row))
            }
        }
    }
}

impl ScheduleCodec for JsonCodec<'_> {
    fn format(&self) -> ScheduleFormat {
        ScheduleFormat::Json
    }

    fn parse(&self, input: &str) -> Result<ParseReport, FormatError> {
        let root: Value = serde_json::from_str(input)?;
        let root = root.as_object().ok_or(FormatError::NotAnObject)?;
        let items = root
            .get("items")
            .and_then(Value::as_array)
            .ok_or(FormatError::MissingItems)?;
        let name = root
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let mut document = ScheduleDocument::new(name);
        let mut warnings = Vec::new();
        let mut notes = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let position = Position::Item(index);
            match self.parse_item(item, &mut notes) {
                Ok(row) => document.push(row),
                Err(message) => {
                    warn!(%position, %message, "skipping schedule item");
                    warnings.push(ParseWarning { position, message });
                }
            }
            for message in notes.drain(..) {
                warn!(%position, %message, "schedule item partially ignored");
                warnings.push(ParseWarning { position, message });
            }
        }
        Ok(ParseReport { document, warnings })
    }

    fn serialize(&self, document: &ScheduleDocument) -> Result<String, FormatError> {
        let items = document
            .items
            .iter()
            .map(|row| match row {
                ScheduleRow::Group(group) => ItemJson::Group {
                    level: group.level,
                    name: group.name.clone(),
                },
                ScheduleRow::Interval(interval) => ItemJson::Interval(IntervalJson {
                    duration: interval.duration.clone(),
                    task: interval.task.clone(),
                    category_name: interval.category_name.clone(),
                    feature_type_name: interval.feature_type_name.clone(),
                    feature_args_list: interval.args.clone(),
                    interval_settings: interval.settings.to_json(),
                }),
            })
            .collect();
        let json = DocumentJson {
            name: &document.name,
            items,
        };
        Ok(serde_json::to_string_pretty(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use woodshed_features::builtin_registry;

    fn parse(input: &str) -> Result<ParseReport, FormatError> {
        let registry = builtin_registry().unwrap();
        JsonCodec::new(&registry).parse(input)
    }

    #[test]
    fn parses_document() {
        let input = json!({
            "name": "Morning",
            "items": [
                { "rowType": "group", "level": 1, "name": "Warmup" },
                {
                    "rowType": "interval",
                    "duration": "5:00",
                    "task": "Changes",
                    "categoryName": "Guitar",
                    "featureTypeName": "Chord Progression",
                    "featureArgsList": ["C", "I", "V", "vi"],
                    "intervalSettings": { "metronome": { "bpm": 90 } }
                }
            ]
        })
        .to_string();
        let report = parse(&input).unwrap();
        assert!(report.warnings.is_empty());
        assert_eq!(report.document.name, "Morning");
        let row = report.document.items[1].as_interval().unwrap();
        assert_eq!(row.args, vec!["C", "I", "V", "vi"]);
        assert_eq!(row.settings.literal().as_deref(), Some("BPM:90"));
    }

    #[test]
    fn unregistered_category_is_skipped() {
        let input = json!({
            "items": [
                { "rowType": "group", "level": 1, "name": "A" },
                { "rowType": "interval", "duration": "1:00", "task": "x",
                  "categoryName": "Nonexistent", "featureTypeName": "", "featureArgsList": [] },
                { "rowType": "interval", "duration": "2:00", "task": "y",
                  "categoryName": "General", "featureTypeName": "Rest", "featureArgsList": [] }
            ]
        })
        .to_string();
        let report = parse(&input).unwrap();
        assert_eq!(report.document.len(), 2);
        assert_eq!(report.document.name, "");
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].position, Position::Item(1));
        assert!(report.warnings[0].message.contains("Nonexistent"));
        assert_eq!(report.document.items[1].as_interval().unwrap().task, "y");
    }

    #[test]
    fn structural_errors_are_fatal() {
        assert!(matches!(parse("{not json"), Err(FormatError::InvalidJson(_))));
        assert!(matches!(parse("[1, 2]"), Err(FormatError::NotAnObject)));
        assert!(matches!(
            parse(r#"{"name": "x"}"#),
            Err(FormatError::MissingItems)
        ));
        assert!(matches!(
            parse(r#"{"items": {}}"#),
            Err(FormatError::MissingItems)
        ));
    }

    #[test]
    fn malformed_items_are_skipped() {
        let input = json!({
            "items": [
                { "rowType": "chord" },
                { "rowType": "group", "level": 0, "name": "zero" },
                { "rowType": "group", "level": 2 }
            ]
        })
        .to_string();
        let report = parse(&input).unwrap();
        assert_eq!(report.document.len(), 1);
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn bad_settings_fall_back_to_default() {
        let input = json!({
            "items": [{ "rowType": "interval", "categoryName": "Guitar",
                        "intervalSettings": { "metronome": { "bpm": 1000 } } }]
        })
        .to_string();
        let report = parse(&input).unwrap();
        let row = report.document.items[0].as_interval().unwrap();
        assert_eq!(row.duration, "0:00");
        assert!(row.settings.is_default());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn default_settings_are_omitted_and_restored() {
        let registry = builtin_registry().unwrap();
        let codec = JsonCodec::new(&registry);
        let mut document = ScheduleDocument::new("Omit");
        document.push(
            IntervalRow::new(registry.default_settings("Guitar").unwrap())
                .with_duration("3:00")
                .with_feature("Scale", ["A", "Dorian", "1", "2"]),
        );
        let written = codec.serialize(&document).unwrap();
        let value: Value = serde_json::from_str(&written).unwrap();
        assert!(value["items"][0].get("intervalSettings").is_none());
        assert_eq!(value["items"][0]["rowType"], "interval");

        let reparsed = codec.parse(&written).unwrap().into_document();
        assert!(reparsed.items[0].as_interval().unwrap().settings.is_default());
        assert_eq!(reparsed, document);
    }
}
