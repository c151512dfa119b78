use serde_json::Value;
use woodshed_builder::{BuildError, ScheduleBuilder};
use woodshed_features::builtin_registry;
use woodshed_formats::{
    codec_for, convert, JsonCodec, ScheduleCodec, ScheduleFormat, TextCodec,
};

const PLAN: &str = "\
# Warmup
5:00, Chromatic
2:00, Break, General/Rest
# Harmony
## Progressions
10:00, Changes, Chord Progression, C, I, V, vi, @BPM:90
5:00, Shapes, Triads, G, false, Minor-Major
## Scales
8:00, Modes, Scale, A, Dorian, 1, 3, 5
";

#[test]
fn text_to_json_and_back_is_lossless() {
    let registry = builtin_registry().unwrap();
    let text = TextCodec::new(&registry, "Guitar").unwrap();
    let json = JsonCodec::new(&registry);

    let from_text = text.parse(PLAN).unwrap();
    assert!(from_text.warnings.is_empty());

    let as_json = json.serialize(&from_text.document).unwrap();
    let from_json = json.parse(&as_json).unwrap();
    assert_eq!(from_json.document, from_text.document);

    let back_to_text = text.serialize(&from_json.document).unwrap();
    assert_eq!(text.parse(&back_to_text).unwrap().document, from_text.document);
}

#[test]
fn legacy_args_are_kept_verbatim_by_the_codecs() {
    let registry = builtin_registry().unwrap();
    let (json, warnings) = convert(
        PLAN,
        ScheduleFormat::Text,
        ScheduleFormat::Json,
        &registry,
        "Guitar",
    )
    .unwrap();
    assert!(warnings.is_empty());
    let value: Value = serde_json::from_str(&json).unwrap();
    let items = value["items"].as_array().unwrap();
    assert_eq!(items.len(), 9);
    assert_eq!(items[6]["featureArgsList"][2], "Minor-Major");
    assert_eq!(items[5]["intervalSettings"]["metronome"]["bpm"], 90);
    assert!(items[1].get("intervalSettings").is_none());
    assert_eq!(items[2]["categoryName"], "General");
}

#[test]
fn json_round_trip_through_boxed_codecs() {
    let registry = builtin_registry().unwrap();
    let json = codec_for(ScheduleFormat::Json, &registry, "Guitar").unwrap();
    let input = r#"{
        "name": "Evening",
        "items": [
            { "rowType": "group", "level": 1, "name": "Reading" },
            { "rowType": "interval", "duration": "15:00", "task": "Etudes",
              "categoryName": "General", "featureTypeName": "Reading",
              "featureArgsList": ["Etude 4"] },
            { "rowType": "interval", "duration": "1:00", "task": "Old",
              "categoryName": "Guitar", "featureTypeName": "Retired Feature",
              "featureArgsList": ["x", "", "y"] }
        ]
    }"#;
    let first = json.parse(input).unwrap();
    assert_eq!(first.document.name, "Evening");
    let second = json.parse(&json.serialize(&first.document).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn unchecked_durations_survive_json_to_text() {
    let registry = builtin_registry().unwrap();
    let input = r#"{
        "name": "Loose",
        "items": [
            { "rowType": "interval", "duration": "5m", "task": "Warm",
              "categoryName": "General" },
            { "rowType": "interval", "duration": "10:00", "task": "Read",
              "categoryName": "General", "featureTypeName": "Reading",
              "featureArgsList": ["Etude 1"] },
            { "rowType": "interval", "duration": "2:00", "task": "Rest",
              "categoryName": "General", "featureTypeName": "Rest" }
        ]
    }"#;
    let (text, warnings) = convert(
        input,
        ScheduleFormat::Json,
        ScheduleFormat::Text,
        &registry,
        "Guitar",
    )
    .unwrap();
    assert!(warnings.is_empty());

    let report = TextCodec::new(&registry, "Guitar").unwrap().parse(&text).unwrap();
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(report.document.len(), 3);
    assert_eq!(report.document.items[0].as_interval().unwrap().duration, "5m");

    let err = ScheduleBuilder::new(&registry)
        .build(&report.document)
        .unwrap_err();
    assert!(matches!(err, BuildError::InvalidDuration { index: 0, .. }));
}
