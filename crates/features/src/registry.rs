use std::fmt;

use serde_json::Value;
use tracing::{debug, warn};
use woodshed_domain::{ConfigurationSchema, DomainError, IntervalSettings};

use crate::codec::FeatureArgs;
use crate::feature::{Feature, FeatureFactory, RuntimeContext};

pub type SettingsFactory = fn() -> Box<dyn IntervalSettings>;
pub type SettingsParser = fn(&Value) -> Result<Box<dyn IntervalSettings>, DomainError>;
/// Parses a text DSL settings literal such as `BPM:120`. Returns `None` when
/// the literal is not one this category understands.
pub type LiteralParser = fn(&str) -> Option<Result<Box<dyn IntervalSettings>, DomainError>>;

#[derive(Clone)]
pub struct FeatureTypeDescriptor {
    pub category: String,
    pub type_name: String,
    pub display_name: String,
    pub schema: ConfigurationSchema,
    pub factory: FeatureFactory,
}

impl FeatureTypeDescriptor {
    pub fn new(
        category: impl Into<String>,
        type_name: impl Into<String>,
        schema: ConfigurationSchema,
        factory: FeatureFactory,
    ) -> Self {
        let type_name = type_name.into();
        Self {
            category: category.into(),
            display_name: type_name.clone(),
            type_name,
            schema,
            factory,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn create(
        &self,
        args: &FeatureArgs,
        context: &RuntimeContext<'_>,
    ) -> anyhow::Result<Box<dyn Feature>> {
        (self.factory)(args, context)
    }
}

impl fmt::Debug for FeatureTypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureTypeDescriptor")
            .field("category", &self.category)
            .field("type_name", &self.type_name)
            .field("display_name", &self.display_name)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// A domain of related feature types plus its settings factory and parsers.
#[derive(Clone)]
pub struct Category {
    name: String,
    display_name: String,
    feature_types: Vec<FeatureTypeDescriptor>,
    settings_factory: SettingsFactory,
    settings_parser: SettingsParser,
    literal_parser: Option<LiteralParser>,
}

impl Category {
    pub fn new(
        name: impl Into<String>,
        settings_factory: SettingsFactory,
        settings_parser: SettingsParser,
    ) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            feature_types: Vec::new(),
            settings_factory,
            settings_parser,
            literal_parser: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_literal_parser(mut self, parser: LiteralParser) -> Self {
        self.literal_parser = Some(parser);
        self
    }

    /// Adds a feature type; an existing type with the same name is replaced.
    pub fn with_feature_type(mut self, descriptor: FeatureTypeDescriptor) -> Self {
        match self
            .feature_types
            .iter_mut()
            .find(|existing| existing.type_name == descriptor.type_name)
        {
            Some(existing) => {
                warn!(
                    category = %self.name,
                    feature_type = %descriptor.type_name,
                    "feature type registered twice, keeping the last one"
                );
                *existing = descriptor;
            }
            None => self.feature_types.push(descriptor),
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn feature_types(&self) -> &[FeatureTypeDescriptor] {
        &self.feature_types
    }

    pub fn feature_type(&self, type_name: &str) -> Option<&FeatureTypeDescriptor> {
        self.feature_types
            .iter()
            .find(|descriptor| descriptor.type_name == type_name)
    }

    pub fn settings_factory(&self) -> SettingsFactory {
        self.settings_factory
    }

    pub fn settings_parser(&self) -> SettingsParser {
        self.settings_parser
    }

    pub fn create_settings(&self) -> Box<dyn IntervalSettings> {
        (self.settings_factory)()
    }

    pub fn parse_settings(&self, json: &Value) -> Result<Box<dyn IntervalSettings>, DomainError> {
        (self.settings_parser)(json)
    }

    pub fn parse_literal(
        &self,
        literal: &str,
    ) -> Option<Result<Box<dyn IntervalSettings>, DomainError>> {
        self.literal_parser.and_then(|parser| parser(literal))
    }

    fn validate(&self) -> Result<(), DomainError> {
        for descriptor in &self.feature_types {
            let owner = format!("{}/{}", self.name, descriptor.type_name);
            if descriptor.category != self.name {
                return Err(DomainError::schema(
                    owner,
                    format!("descriptor belongs to category {:?}", descriptor.category),
                ));
            }
            descriptor.schema.validate(&owner)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Category")
            .field("name", &self.name)
            .field("display_name", &self.display_name)
            .field("feature_types", &self.feature_types)
            .finish_non_exhaustive()
    }
}

/// Collects categories during startup; [`RegistryBuilder::build`] freezes them.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    categories: Vec<Category>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a category after validating every schema it carries.
    /// Registering a name twice replaces the earlier category.
    pub fn register(&mut self, category: Category) -> Result<&mut Self, DomainError> {
        category.validate()?;
        match self
            .categories
            .iter_mut()
            .find(|existing| existing.name == category.name)
        {
            Some(existing) => {
                warn!(category = %category.name, "category registered twice, keeping the last one");
                *existing = category;
            }
            None => {
                debug!(
                    category = %category.name,
                    feature_types = category.feature_types.len(),
                    "registered category"
                );
                self.categories.push(category);
            }
        }
        Ok(self)
    }

    pub fn build(self) -> FeatureRegistry {
        FeatureRegistry {
            categories: self.categories,
        }
    }
}

/// Read-only lookup from category and feature type names to their descriptors.
///
/// Every lookup answers `None` for unknown names; schedules may legitimately
/// reference types that are no longer registered.
#[derive(Debug, Default)]
pub struct FeatureRegistry {
    categories: Vec<Category>,
}

impl FeatureRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Categories in registration order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.name == name)
    }

    pub fn feature_type(&self, category: &str, type_name: &str) -> Option<&FeatureTypeDescriptor> {
        self.category(category)?.feature_type(type_name)
    }

    pub fn available_feature_types(&self, category: &str) -> Option<&[FeatureTypeDescriptor]> {
        self.category(category).map(Category::feature_types)
    }

    /// First registered feature type called `type_name`, in any category.
    pub fn find_feature_type(&self, type_name: &str) -> Option<&FeatureTypeDescriptor> {
        self.categories
            .iter()
            .find_map(|category| category.feature_type(type_name))
    }

    pub fn settings_factory(&self, category: &str) -> Option<SettingsFactory> {
        self.category(category).map(Category::settings_factory)
    }

    pub fn settings_parser(&self, category: &str) -> Option<SettingsParser> {
        self.category(category).map(Category::settings_parser)
    }

    pub fn default_settings(&self, category: &str) -> Option<Box<dyn IntervalSettings>> {
        self.category(category).map(Category::create_settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use woodshed_domain::{ArgSpec, EmptySettings};

    #[derive(Debug)]
    struct Noop;

    impl Feature for Noop {
        fn type_name(&self) -> &str {
            "Noop"
        }

        fn summary(&self) -> String {
            "noop".into()
        }
    }

    fn noop(_: &FeatureArgs, _: &RuntimeContext<'_>) -> anyhow::Result<Box<dyn Feature>> {
        Ok(Box::new(Noop))
    }

    fn empty_settings() -> Box<dyn IntervalSettings> {
        Box::new(EmptySettings::new("Drums"))
    }

    fn parse_empty(_: &Value) -> Result<Box<dyn IntervalSettings>, DomainError> {
        Ok(empty_settings())
    }

    fn drums(schema: ConfigurationSchema) -> Category {
        Category::new("Drums", empty_settings, parse_empty)
            .with_feature_type(FeatureTypeDescriptor::new("Drums", "Rudiment", schema, noop))
    }

    #[test]
    fn lookups_return_none_for_unknown_names() {
        let mut builder = FeatureRegistry::builder();
        builder.register(drums(ConfigurationSchema::empty())).unwrap();
        let registry = builder.build();

        assert!(registry.category("Drums").is_some());
        assert!(registry.category("Piano").is_none());
        assert!(registry.feature_type("Drums", "Rudiment").is_some());
        assert!(registry.feature_type("Drums", "Groove").is_none());
        assert!(registry.feature_type("Piano", "Rudiment").is_none());
        assert!(registry.available_feature_types("Piano").is_none());
        assert!(registry.settings_parser("Piano").is_none());
        assert_eq!(registry.available_feature_types("Drums").unwrap().len(), 1);
        assert_eq!(
            registry.find_feature_type("Rudiment").unwrap().category,
            "Drums"
        );
        assert!(registry.default_settings("Drums").unwrap().is_default());
    }

    #[test]
    fn re_registration_overwrites() {
        let mut builder = FeatureRegistry::builder();
        builder.register(drums(ConfigurationSchema::empty())).unwrap();
        builder
            .register(
                drums(ConfigurationSchema::new(vec![ArgSpec::string("name")]))
                    .with_display_name("Percussion"),
            )
            .unwrap();
        let registry = builder.build();
        assert_eq!(registry.categories().len(), 1);
        let category = registry.category("Drums").unwrap();
        assert_eq!(category.display_name(), "Percussion");
        assert_eq!(
            category.feature_type("Rudiment").unwrap().schema.args().len(),
            1
        );
    }

    #[test]
    fn ambiguous_schema_is_rejected_at_registration() {
        let schema = ConfigurationSchema::new(vec![
            ArgSpec::string("sticking").variadic(),
            ArgSpec::number("bpm"),
        ]);
        let mut builder = FeatureRegistry::builder();
        let err = builder.register(drums(schema)).unwrap_err();
        assert!(err.to_string().contains("Drums/Rudiment"));
        assert!(builder.build().category("Drums").is_none());
    }

    #[test]
    fn descriptor_category_must_match() {
        let category = Category::new("Drums", empty_settings, parse_empty).with_feature_type(
            FeatureTypeDescriptor::new("Piano", "Scales", ConfigurationSchema::empty(), noop),
        );
        assert!(FeatureRegistry::builder().register(category).is_err());
    }

    #[test]
    fn factories_are_invoked_through_descriptors() {
        let descriptor =
            FeatureTypeDescriptor::new("Drums", "Rudiment", ConfigurationSchema::empty(), noop);
        let settings = EmptySettings::new("Drums");
        let context = RuntimeContext {
            interval_index: 0,
            duration: time::Duration::minutes(1),
            settings: &settings,
        };
        let feature = descriptor.create(&FeatureArgs::new(), &context).unwrap();
        assert_eq!(feature.type_name(), "Noop");
    }
}
