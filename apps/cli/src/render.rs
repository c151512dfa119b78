use std::fmt::Write;

use anyhow::{anyhow, Result};
use woodshed_builder::BuiltSchedule;
use woodshed_domain::{format_duration, ArgSpec, BaseType, ScheduleDocument, ScheduleRow};
use woodshed_features::FeatureRegistry;

const INDENT: &str = "  ";

/// Every row of `document`, indented by its nesting depth.
pub fn outline(document: &ScheduleDocument) -> Result<String> {
    let mut out = String::new();
    if !document.name.is_empty() {
        writeln!(out, "{}", document.name)?;
    }
    for (row, indent) in document.items.iter().zip(document.indents()) {
        let pad = INDENT.repeat(indent as usize);
        match row {
            ScheduleRow::Group(group) => {
                writeln!(out, "{pad}{} {}", "#".repeat(group.level as usize), group.name)?;
            }
            ScheduleRow::Interval(interval) => {
                write!(out, "{pad}{:>7}  {}", interval.duration, interval.task)?;
                if interval.has_feature() {
                    write!(
                        out,
                        " ({}/{})",
                        interval.category_name, interval.feature_type_name
                    )?;
                }
                out.push('\n');
            }
        }
    }
    Ok(out)
}

pub fn schedule(schedule: &BuiltSchedule) -> Result<String> {
    let mut out = String::new();
    for interval in &schedule.intervals {
        writeln!(
            out,
            "{:>8}  {:>7}  {}{}",
            format_duration(interval.start),
            format_duration(interval.duration),
            INDENT.repeat(interval.indent as usize),
            interval.summary()
        )?;
    }
    writeln!(out, "total {}", format_duration(schedule.total))?;
    Ok(out)
}

/// Registered categories and their feature types, optionally narrowed to
/// one category.
pub fn features(registry: &FeatureRegistry, only: Option<&str>) -> Result<String> {
    let categories = match only {
        Some(name) => vec![registry
            .category(name)
            .ok_or_else(|| anyhow!("unknown category {name:?}"))?],
        None => registry.categories().iter().collect(),
    };
    let mut out = String::new();
    for category in categories {
        writeln!(out, "{}", category.display_name())?;
        for descriptor in category.feature_types() {
            let args: Vec<String> = descriptor.schema.args().iter().map(describe_arg).collect();
            writeln!(out, "{INDENT}{}({})", descriptor.type_name, args.join(", "))?;
        }
    }
    Ok(out)
}

fn describe_arg(spec: &ArgSpec) -> String {
    let base = match spec.base_type {
        BaseType::String => "text".to_string(),
        BaseType::Number => "number".to_string(),
        BaseType::Boolean => "true|false".to_string(),
        BaseType::Enum => spec.enum_values.join("|"),
        BaseType::NestedBlock => "settings".to_string(),
    };
    let repeat = if spec.is_variadic() { "..." } else { "" };
    format!("{}: {base}{repeat}", spec.name)
}
