use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use woodshed_domain::{ArgSpec, ConfigurationSchema, DomainError, IntervalSettings};

use crate::codec::{ArgValue, FeatureArgs};
use crate::feature::{Feature, FeatureFactory, RuntimeContext};
use crate::registry::{Category, FeatureTypeDescriptor};

pub const CATEGORY: &str = "Guitar";
pub const METRONOME_BLOCK: &str = "metronome";

pub const KEYS: [&str; 12] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];
pub const MODES: [&str; 7] = [
    "Ionian",
    "Dorian",
    "Phrygian",
    "Lydian",
    "Mixolydian",
    "Aeolian",
    "Locrian",
];
pub const POSITIONS: [&str; 5] = ["1", "2", "3", "4", "5"];
pub const TRIAD_QUALITIES: [&str; 4] = ["Major", "Minor", "Diminished", "Augmented"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetronomeSettings {
    /// Click tempo; `None` leaves the metronome off.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bpm: Option<u32>,
    pub beats_per_bar: u8,
    pub accent_first_beat: bool,
}

impl Default for MetronomeSettings {
    fn default() -> Self {
        Self {
            bpm: None,
            beats_per_bar: 4,
            accent_first_beat: true,
        }
    }
}

impl MetronomeSettings {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(bpm) = self.bpm {
            if !(10..=400).contains(&bpm) {
                return Err(DomainError::validation(
                    "metronome bpm must be between 10 and 400",
                ));
            }
        }
        if !(1..=16).contains(&self.beats_per_bar) {
            return Err(DomainError::validation(
                "metronome beats per bar must be between 1 and 16",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuitarSettings {
    pub metronome: MetronomeSettings,
}

impl GuitarSettings {
    pub fn with_bpm(bpm: u32) -> Result<Self, DomainError> {
        let settings = Self {
            metronome: MetronomeSettings {
                bpm: Some(bpm),
                ..MetronomeSettings::default()
            },
        };
        settings.metronome.validate()?;
        Ok(settings)
    }
}

impl IntervalSettings for GuitarSettings {
    fn category(&self) -> &str {
        CATEGORY
    }

    fn to_json(&self) -> Option<Value> {
        if *self == Self::default() {
            return None;
        }
        serde_json::to_value(self).ok()
    }

    fn block(&self, name: &str) -> Option<Value> {
        match name {
            METRONOME_BLOCK => serde_json::to_value(&self.metronome).ok(),
            _ => None,
        }
    }

    fn set_block(&mut self, name: &str, value: Value) -> Result<(), DomainError> {
        match name {
            METRONOME_BLOCK => {
                let metronome: MetronomeSettings = serde_json::from_value(value)?;
                metronome.validate()?;
                self.metronome = metronome;
                Ok(())
            }
            other => Err(DomainError::validation(format!(
                "guitar settings have no block named {other:?}"
            ))),
        }
    }

    fn literal(&self) -> Option<String> {
        self.metronome.bpm.map(|bpm| format!("BPM:{bpm}"))
    }

    fn clone_box(&self) -> Box<dyn IntervalSettings> {
        Box::new(self.clone())
    }
}

pub fn create_settings() -> Box<dyn IntervalSettings> {
    Box::new(GuitarSettings::default())
}

pub fn parse_settings(json: &Value) -> Result<Box<dyn IntervalSettings>, DomainError> {
    let settings: GuitarSettings = serde_json::from_value(json.clone())?;
    settings.metronome.validate()?;
    Ok(Box::new(settings))
}

pub fn parse_literal(literal: &str) -> Option<Result<Box<dyn IntervalSettings>, DomainError>> {
    let (key, value) = literal.split_once(':')?;
    if !key.trim().eq_ignore_ascii_case("BPM") {
        return None;
    }
    let parsed = value
        .trim()
        .parse::<u32>()
        .map_err(|_| DomainError::validation(format!("invalid BPM value {value:?}")))
        .and_then(GuitarSettings::with_bpm)
        .map(|settings| Box::new(settings) as Box<dyn IntervalSettings>);
    Some(parsed)
}

pub fn category() -> Category {
    let metronome_schema = ConfigurationSchema::new(vec![
        ArgSpec::number("bpm"),
        ArgSpec::number("beatsPerBar"),
        ArgSpec::boolean("accentFirstBeat"),
    ]);
    Category::new(CATEGORY, create_settings, parse_settings)
        .with_display_name("Guitar")
        .with_literal_parser(parse_literal)
        .with_feature_type(descriptor(
            "Metronome",
            ConfigurationSchema::new(vec![ArgSpec::nested(
                METRONOME_BLOCK,
                metronome_schema.clone(),
            )]),
            MetronomeDrill::create,
        ))
        .with_feature_type(
            descriptor(
                "Chord Progression",
                ConfigurationSchema::new(vec![
                    ArgSpec::enumeration("key", KEYS),
                    ArgSpec::nested(METRONOME_BLOCK, metronome_schema),
                    ArgSpec::string("chords").variadic(),
                ]),
                ChordProgression::create,
            )
            .with_display_name("Chord progression"),
        )
        .with_feature_type(descriptor(
            "Scale",
            ConfigurationSchema::new(vec![
                ArgSpec::enumeration("root", KEYS),
                ArgSpec::enumeration("mode", MODES),
                ArgSpec::multi_toggle("positions", POSITIONS),
            ]),
            ScaleDrill::create,
        ))
        .with_feature_type(descriptor(
            "Triads",
            ConfigurationSchema::new(vec![
                ArgSpec::enumeration("key", KEYS),
                ArgSpec::boolean("inversions"),
                ArgSpec::multi_toggle("qualities", TRIAD_QUALITIES),
            ]),
            TriadDrill::create,
        ))
        .with_feature_type(
            descriptor(
                "Fretboard Notes",
                ConfigurationSchema::new(vec![
                    ArgSpec::number("notesPerRound"),
                    ArgSpec::boolean("naturalsOnly"),
                ]),
                FretboardNotes::create,
            )
            .with_display_name("Fretboard notes"),
        )
}

fn descriptor(
    name: &str,
    schema: ConfigurationSchema,
    factory: FeatureFactory,
) -> FeatureTypeDescriptor {
    FeatureTypeDescriptor::new(CATEGORY, name, schema, factory)
}

fn metronome_of(args: &FeatureArgs, context: &RuntimeContext<'_>) -> MetronomeSettings {
    args.block(METRONOME_BLOCK)
        .cloned()
        .or_else(|| context.settings.block(METRONOME_BLOCK))
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default()
}

fn choice(args: &FeatureArgs, name: &str, allowed: &[&str]) -> Result<String> {
    match args.text(name) {
        Some(value) if allowed.contains(&value) => Ok(value.to_string()),
        Some("") | None => bail!("{name} is required"),
        Some(value) => bail!("{value:?} is not a valid {name}"),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetronomeDrill {
    pub bpm: u32,
    pub beats_per_bar: u8,
}

impl MetronomeDrill {
    fn create(args: &FeatureArgs, context: &RuntimeContext<'_>) -> Result<Box<dyn Feature>> {
        let metronome = metronome_of(args, context);
        let Some(bpm) = metronome.bpm else {
            bail!("metronome interval needs a tempo (add @BPM:<n>)");
        };
        Ok(Box::new(Self {
            bpm,
            beats_per_bar: metronome.beats_per_bar,
        }))
    }
}

impl Feature for MetronomeDrill {
    fn type_name(&self) -> &str {
        "Metronome"
    }

    fn summary(&self) -> String {
        format!("metronome at {} bpm, {}/4", self.bpm, self.beats_per_bar)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChordProgression {
    pub key: String,
    pub chords: Vec<String>,
    pub bpm: Option<u32>,
}

impl ChordProgression {
    fn create(args: &FeatureArgs, context: &RuntimeContext<'_>) -> Result<Box<dyn Feature>> {
        let key = choice(args, "key", &KEYS)?;
        let chords: Vec<String> = args
            .list("chords")
            .unwrap_or_default()
            .iter()
            .filter_map(|chord| match chord {
                ArgValue::Text(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
                _ => None,
            })
            .collect();
        if chords.is_empty() {
            bail!("chord progression needs at least one chord");
        }
        Ok(Box::new(Self {
            key,
            chords,
            bpm: metronome_of(args, context).bpm,
        }))
    }
}

impl Feature for ChordProgression {
    fn type_name(&self) -> &str {
        "Chord Progression"
    }

    fn summary(&self) -> String {
        let tempo = self
            .bpm
            .map(|bpm| format!(" at {bpm} bpm"))
            .unwrap_or_default();
        format!("{} in {}{tempo}", self.chords.join(" "), self.key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScaleDrill {
    pub root: String,
    pub mode: String,
    pub positions: Vec<String>,
}

impl ScaleDrill {
    fn create(args: &FeatureArgs, _context: &RuntimeContext<'_>) -> Result<Box<dyn Feature>> {
        let root = choice(args, "root", &KEYS)?;
        let mode = choice(args, "mode", &MODES)?;
        let mut positions = args.selection("positions").unwrap_or_default().to_vec();
        if positions.is_empty() {
            positions = POSITIONS.iter().map(|p| p.to_string()).collect();
        }
        Ok(Box::new(Self {
            root,
            mode,
            positions,
        }))
    }
}

impl Feature for ScaleDrill {
    fn type_name(&self) -> &str {
        "Scale"
    }

    fn summary(&self) -> String {
        format!(
            "{} {} in positions {}",
            self.root,
            self.mode,
            self.positions.join(", ")
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriadDrill {
    pub key: String,
    pub inversions: bool,
    pub qualities: Vec<String>,
}

impl TriadDrill {
    fn create(args: &FeatureArgs, _context: &RuntimeContext<'_>) -> Result<Box<dyn Feature>> {
        let key = choice(args, "key", &KEYS)?;
        let qualities = args.selection("qualities").unwrap_or_default().to_vec();
        if qualities.is_empty() {
            bail!("select at least one triad quality");
        }
        Ok(Box::new(Self {
            key,
            inversions: args.boolean("inversions").unwrap_or(false),
            qualities,
        }))
    }
}

impl Feature for TriadDrill {
    fn type_name(&self) -> &str {
        "Triads"
    }

    fn summary(&self) -> String {
        let inversions = if self.inversions { " with inversions" } else { "" };
        format!(
            "{} triads in {}{inversions}",
            self.qualities.join("/"),
            self.key
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FretboardNotes {
    pub notes_per_round: u32,
    pub naturals_only: bool,
}

impl FretboardNotes {
    fn create(args: &FeatureArgs, _context: &RuntimeContext<'_>) -> Result<Box<dyn Feature>> {
        let notes = args.number("notesPerRound").unwrap_or(0.0);
        let notes_per_round = match notes {
            n if n == 0.0 => 12,
            n if (1.0..=120.0).contains(&n) && n.fract() == 0.0 => n as u32,
            n => bail!("notes per round must be a whole number between 1 and 120, got {n}"),
        };
        Ok(Box::new(Self {
            notes_per_round,
            naturals_only: args.boolean("naturalsOnly").unwrap_or(false),
        }))
    }
}

impl Feature for FretboardNotes {
    fn type_name(&self) -> &str {
        "Fretboard Notes"
    }

    fn summary(&self) -> String {
        let pool = if self.naturals_only { "natural" } else { "chromatic" };
        format!("{} {pool} notes per round", self.notes_per_round)
    }
}
