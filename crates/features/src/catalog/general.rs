use anyhow::{bail, Result};
use serde_json::Value;
use woodshed_domain::{ArgSpec, ConfigurationSchema, DomainError, EmptySettings, IntervalSettings};

use crate::codec::FeatureArgs;
use crate::feature::{Feature, RuntimeContext};
use crate::registry::{Category, FeatureTypeDescriptor};

pub const CATEGORY: &str = "General";

fn create_settings() -> Box<dyn IntervalSettings> {
    Box::new(EmptySettings::new(CATEGORY))
}

fn parse_settings(json: &Value) -> Result<Box<dyn IntervalSettings>, DomainError> {
    match json {
        Value::Null => Ok(create_settings()),
        Value::Object(map) if map.is_empty() => Ok(create_settings()),
        other => Err(DomainError::validation(format!(
            "general intervals take no settings, got {other}"
        ))),
    }
}

pub fn category() -> Category {
    Category::new(CATEGORY, create_settings, parse_settings)
        .with_feature_type(FeatureTypeDescriptor::new(
            CATEGORY,
            "Rest",
            ConfigurationSchema::empty(),
            Rest::create,
        ))
        .with_feature_type(FeatureTypeDescriptor::new(
            CATEGORY,
            "Reading",
            ConfigurationSchema::new(vec![ArgSpec::string("material")]),
            Reading::create,
        ))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rest;

impl Rest {
    fn create(_args: &FeatureArgs, _context: &RuntimeContext<'_>) -> Result<Box<dyn Feature>> {
        Ok(Box::new(Rest))
    }
}

impl Feature for Rest {
    fn type_name(&self) -> &str {
        "Rest"
    }

    fn summary(&self) -> String {
        "rest".to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub material: String,
}

impl Reading {
    fn create(args: &FeatureArgs, _context: &RuntimeContext<'_>) -> Result<Box<dyn Feature>> {
        let material = args.text("material").unwrap_or_default().trim();
        if material.is_empty() {
            bail!("reading interval needs material to read");
        }
        Ok(Box::new(Reading {
            material: material.to_string(),
        }))
    }
}

impl Feature for Reading {
    fn type_name(&self) -> &str {
        "Reading"
    }

    fn summary(&self) -> String {
        format!("read {}", self.material)
    }
}
