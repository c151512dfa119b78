//! Conversion between a feature's configuration schema and the flat list of
//! strings stored on an interval row.
//!
//! Decoding walks the schema left to right with a cursor into the value list:
//! settings-bound blocks consume nothing, a variadic argument consumes every
//! remaining value, and every other argument consumes exactly one. Values the
//! schema has no slot for are kept in [`FeatureArgs::rest`] so that encoding
//! stays lossless even for rows whose feature type is unknown.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use woodshed_domain::{ArgSpec, BaseType, ConfigurationSchema, DomainError, IntervalSettings};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("expected at most {expected} argument values, found {found}")]
    TooManyValues { expected: usize, found: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub enum ArgValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Choice(String),
    List(Vec<ArgValue>),
    /// Labels picked in a multi-toggle, in schema order.
    Selection(Vec<String>),
    Block(Value),
}

impl ArgValue {
    fn render(&self) -> String {
        match self {
            ArgValue::Text(text) | ArgValue::Choice(text) => text.clone(),
            ArgValue::Number(number) => format_number(*number),
            ArgValue::Boolean(flag) => flag.to_string(),
            ArgValue::List(items) => items
                .iter()
                .map(ArgValue::render)
                .collect::<Vec<_>>()
                .join(" "),
            ArgValue::Selection(labels) => labels.join("-"),
            ArgValue::Block(_) => String::new(),
        }
    }
}

/// Structured arguments of one interval, keyed by argument name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureArgs {
    values: Vec<(String, ArgValue)>,
    rest: Vec<String>,
}

impl FeatureArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: ArgValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ArgValue) {
        let name = name.into();
        match self.values.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ArgValue::Text(text) | ArgValue::Choice(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            ArgValue::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            ArgValue::Boolean(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn list(&self, name: &str) -> Option<&[ArgValue]> {
        match self.get(name)? {
            ArgValue::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn selection(&self, name: &str) -> Option<&[String]> {
        match self.get(name)? {
            ArgValue::Selection(labels) => Some(labels.as_slice()),
            _ => None,
        }
    }

    pub fn block(&self, name: &str) -> Option<&Value> {
        match self.get(name)? {
            ArgValue::Block(value) if !value.is_null() => Some(value),
            _ => None,
        }
    }

    /// Values left over after every schema slot was filled.
    pub fn rest(&self) -> &[String] {
        &self.rest
    }
}

/// Builds structured arguments from a positional value list.
///
/// Settings-bound blocks are read from `settings` by argument name; pass
/// `None` when no settings object is at hand and they decode as `null`.
pub fn decode(
    schema: &ConfigurationSchema,
    values: &[String],
    settings: Option<&dyn IntervalSettings>,
) -> FeatureArgs {
    let mut args = FeatureArgs::new();
    let mut cursor = 0;
    for spec in schema.args() {
        if spec.is_settings_bound() {
            let block = settings
                .and_then(|settings| settings.block(&spec.name))
                .unwrap_or(Value::Null);
            args.insert(spec.name.clone(), ArgValue::Block(block));
            continue;
        }
        if spec.is_variadic() {
            let remaining = values.get(cursor..).unwrap_or_default();
            cursor = values.len();
            let value = if spec.is_multi_toggle() {
                ArgValue::Selection(decode_selection(spec, remaining))
            } else {
                ArgValue::List(
                    remaining
                        .iter()
                        .map(|raw| decode_scalar(spec, raw))
                        .collect(),
                )
            };
            args.insert(spec.name.clone(), value);
            continue;
        }
        let raw = values.get(cursor).map(String::as_str).unwrap_or_default();
        cursor += 1;
        args.insert(spec.name.clone(), decode_scalar(spec, raw));
    }
    if cursor < values.len() {
        debug!(
            extra = values.len() - cursor,
            "argument list is longer than its schema"
        );
        args.rest = values[cursor..].to_vec();
    }
    args
}

/// Flattens structured arguments back into a positional value list.
pub fn encode(schema: &ConfigurationSchema, args: &FeatureArgs) -> Vec<String> {
    let mut values = Vec::new();
    for spec in schema.positional_args() {
        let value = args.get(&spec.name);
        if !spec.is_variadic() {
            values.push(match value {
                Some(value) => value.render(),
                None => empty_value(spec.base_type).to_string(),
            });
            continue;
        }
        match value {
            Some(ArgValue::Selection(selected)) if spec.is_multi_toggle() => values.extend(
                spec.enum_values
                    .iter()
                    .filter(|label| selected.contains(label))
                    .cloned(),
            ),
            Some(ArgValue::Selection(selected)) => values.extend(selected.iter().cloned()),
            Some(ArgValue::List(items)) => values.extend(items.iter().map(ArgValue::render)),
            Some(ArgValue::Block(_)) | None => {}
            Some(scalar) => values.push(scalar.render()),
        }
    }
    values.extend(args.rest.iter().cloned());
    values
}

/// Checks that `values` fits the schema's slots.
pub fn check_arity(schema: &ConfigurationSchema, values: &[String]) -> Result<(), CodecError> {
    let expected = schema.single_slot_count();
    if !schema.has_variadic() && values.len() > expected {
        return Err(CodecError::TooManyValues {
            expected,
            found: values.len(),
        });
    }
    Ok(())
}

/// Writes decoded settings-bound blocks back into `settings`.
pub fn apply_blocks(
    schema: &ConfigurationSchema,
    args: &FeatureArgs,
    settings: &mut dyn IntervalSettings,
) -> Result<(), DomainError> {
    for spec in schema.args().iter().filter(|spec| spec.is_settings_bound()) {
        if let Some(block) = args.block(&spec.name) {
            settings.set_block(&spec.name, block.clone())?;
        }
    }
    Ok(())
}

fn decode_scalar(spec: &ArgSpec, raw: &str) -> ArgValue {
    match spec.base_type {
        BaseType::String | BaseType::NestedBlock => ArgValue::Text(raw.to_string()),
        BaseType::Number => ArgValue::Number(parse_number(raw)),
        BaseType::Boolean => ArgValue::Boolean(raw.trim().eq_ignore_ascii_case("true")),
        BaseType::Enum => {
            if !raw.is_empty() && !spec.enum_values.iter().any(|label| label == raw) {
                debug!(arg = %spec.name, value = raw, "value is not one of the enum labels");
            }
            ArgValue::Choice(raw.to_string())
        }
    }
}

fn decode_selection(spec: &ArgSpec, raw: &[String]) -> Vec<String> {
    let tokens: Vec<&str> = match raw {
        [single] if single.contains('-') => single.split('-').map(str::trim).collect(),
        _ => raw.iter().map(|token| token.trim()).collect(),
    };
    for token in &tokens {
        if !token.is_empty() && !spec.enum_values.iter().any(|label| label == token) {
            warn!(arg = %spec.name, label = *token, "dropping unknown toggle label");
        }
    }
    spec.enum_values
        .iter()
        .filter(|label| tokens.contains(&label.as_str()))
        .cloned()
        .collect()
}

fn empty_value(base_type: BaseType) -> &'static str {
    match base_type {
        BaseType::Number => "0",
        BaseType::Boolean => "false",
        _ => "",
    }
}

fn parse_number(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .unwrap_or(0.0)
}

fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use woodshed_domain::EmptySettings;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn progression() -> ConfigurationSchema {
        ConfigurationSchema::new(vec![
            ArgSpec::string("key"),
            ArgSpec::string("chords").variadic(),
        ])
    }

    fn triads() -> ConfigurationSchema {
        ConfigurationSchema::new(vec![
            ArgSpec::enumeration("key", ["C", "G", "D"]),
            ArgSpec::boolean("inversions"),
            ArgSpec::multi_toggle("qualities", ["Major", "Minor", "Diminished"]),
        ])
    }

    #[test]
    fn variadic_consumes_remaining_values() {
        let values = strings(&["C", "I", "V", "vi"]);
        let args = decode(&progression(), &values, None);
        assert_eq!(args.text("key"), Some("C"));
        assert_eq!(
            args.list("chords").unwrap(),
            &[
                ArgValue::Text("I".into()),
                ArgValue::Text("V".into()),
                ArgValue::Text("vi".into()),
            ]
        );
        assert_eq!(encode(&progression(), &args), values);
    }

    #[test]
    fn missing_single_values_decode_as_empty() {
        let schema = ConfigurationSchema::new(vec![
            ArgSpec::string("a"),
            ArgSpec::number("b"),
            ArgSpec::boolean("c"),
        ]);
        let args = decode(&schema, &strings(&["x"]), None);
        assert_eq!(args.text("a"), Some("x"));
        assert_eq!(args.number("b"), Some(0.0));
        assert_eq!(args.boolean("c"), Some(false));
        assert_eq!(encode(&schema, &args), strings(&["x", "0", "false"]));
    }

    #[test]
    fn numbers_and_booleans_round_trip() {
        let schema = ConfigurationSchema::new(vec![
            ArgSpec::number("count"),
            ArgSpec::number("ratio"),
            ArgSpec::boolean("flag"),
        ]);
        let values = strings(&["12", "0.5", "true"]);
        let args = decode(&schema, &values, None);
        assert_eq!(args.number("count"), Some(12.0));
        assert_eq!(args.boolean("flag"), Some(true));
        assert_eq!(encode(&schema, &args), values);
        assert_eq!(decode(&schema, &strings(&["abc"]), None).number("count"), Some(0.0));
    }

    #[test]
    fn multi_toggle_is_written_in_schema_order() {
        let args = decode(&triads(), &strings(&["G", "true", "Minor", "Major"]), None);
        assert_eq!(
            args.selection("qualities").unwrap(),
            &["Major".to_string(), "Minor".to_string()]
        );
        let encoded = encode(&triads(), &args);
        assert_eq!(encoded, strings(&["G", "true", "Major", "Minor"]));
        assert_eq!(encode(&triads(), &decode(&triads(), &encoded, None)), encoded);
    }

    #[test]
    fn legacy_hyphen_token_is_split() {
        let args = decode(&triads(), &strings(&["D", "false", "Diminished-Major"]), None);
        assert_eq!(
            args.selection("qualities").unwrap(),
            &["Major".to_string(), "Diminished".to_string()]
        );
        assert_eq!(
            encode(&triads(), &args),
            strings(&["D", "false", "Major", "Diminished"])
        );
    }

    #[test]
    fn unknown_toggle_labels_are_dropped() {
        let args = decode(&triads(), &strings(&["C", "false", "Major", "Sus4"]), None);
        assert_eq!(args.selection("qualities").unwrap(), &["Major".to_string()]);
    }

    #[test]
    fn nested_blocks_consume_no_values() {
        let schema = ConfigurationSchema::new(vec![
            ArgSpec::string("key"),
            ArgSpec::nested("metronome", ConfigurationSchema::empty()),
            ArgSpec::string("chords").variadic(),
        ]);
        let settings: Box<dyn IntervalSettings> = Box::new(EmptySettings::new("General"));
        let values = strings(&["A", "ii", "V"]);
        let args = decode(&schema, &values, Some(settings.as_ref()));
        assert_eq!(args.get("metronome"), Some(&ArgValue::Block(Value::Null)));
        assert!(args.block("metronome").is_none());
        assert_eq!(args.list("chords").unwrap().len(), 2);
        assert_eq!(encode(&schema, &args), values);
    }

    #[test]
    fn unknown_schema_keeps_values_opaque() {
        let values = strings(&["anything", "goes", ""]);
        let args = decode(&ConfigurationSchema::empty(), &values, None);
        assert_eq!(args.rest(), values.as_slice());
        assert_eq!(encode(&ConfigurationSchema::empty(), &args), values);
    }

    #[test]
    fn arity_check_flags_extra_values() {
        let schema = ConfigurationSchema::new(vec![ArgSpec::string("only")]);
        assert!(check_arity(&schema, &strings(&["a"])).is_ok());
        assert_eq!(
            check_arity(&schema, &strings(&["a", "b"])),
            Err(CodecError::TooManyValues {
                expected: 1,
                found: 2
            })
        );
        assert!(check_arity(&progression(), &strings(&["a", "b", "c"])).is_ok());
    }

    #[test]
    fn encoding_structured_args_without_decoding() {
        let args = FeatureArgs::new()
            .with("key", ArgValue::Choice("C".into()))
            .with(
                "qualities",
                ArgValue::Selection(vec!["Diminished".into(), "Major".into()]),
            );
        assert_eq!(
            encode(&triads(), &args),
            strings(&["C", "false", "Major", "Diminished"])
        );
    }
}
