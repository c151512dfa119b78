use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::DomainError;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum BaseType {
    String,
    Number,
    Boolean,
    Enum,
    /// Settings-bound block; its data lives in the interval settings, not in
    /// the positional argument list.
    NestedBlock,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Arity {
    #[default]
    Single,
    Variadic,
}

/// How an editor should present an argument. Only `MultiToggle` affects the
/// positional encoding (selected labels are written in schema order).
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum UiHint {
    #[default]
    Input,
    MultiToggle,
    Popover,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArgSpec {
    pub name: String,
    pub base_type: BaseType,
    #[serde(default)]
    pub arity: Arity,
    #[serde(default)]
    pub ui_hint: UiHint,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_schema: Option<ConfigurationSchema>,
}

impl ArgSpec {
    fn with_type(name: impl Into<String>, base_type: BaseType) -> Self {
        Self {
            name: name.into(),
            base_type,
            arity: Arity::Single,
            ui_hint: UiHint::Input,
            enum_values: Vec::new(),
            nested_schema: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::with_type(name, BaseType::String)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::with_type(name, BaseType::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::with_type(name, BaseType::Boolean)
    }

    pub fn enumeration<I, S>(name: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut spec = Self::with_type(name, BaseType::Enum);
        spec.enum_values = labels.into_iter().map(Into::into).collect();
        spec
    }

    /// A variadic enum rendered as a set of toggles.
    pub fn multi_toggle<I, S>(name: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::enumeration(name, labels)
            .variadic()
            .with_hint(UiHint::MultiToggle)
    }

    pub fn nested(name: impl Into<String>, schema: ConfigurationSchema) -> Self {
        let mut spec = Self::with_type(name, BaseType::NestedBlock);
        spec.ui_hint = UiHint::Popover;
        spec.nested_schema = Some(schema);
        spec
    }

    pub fn variadic(mut self) -> Self {
        self.arity = Arity::Variadic;
        self
    }

    pub fn with_hint(mut self, hint: UiHint) -> Self {
        self.ui_hint = hint;
        self
    }

    pub fn is_settings_bound(&self) -> bool {
        self.base_type == BaseType::NestedBlock
    }

    pub fn is_variadic(&self) -> bool {
        self.arity == Arity::Variadic
    }

    pub fn is_multi_toggle(&self) -> bool {
        self.ui_hint == UiHint::MultiToggle
            && self.base_type == BaseType::Enum
            && self.is_variadic()
    }
}

/// Ordered argument list of one feature type.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ConfigurationSchema {
    args: Vec<ArgSpec>,
}

impl ConfigurationSchema {
    pub fn new(args: Vec<ArgSpec>) -> Self {
        Self { args }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn args(&self) -> &[ArgSpec] {
        &self.args
    }

    pub fn get(&self, name: &str) -> Option<&ArgSpec> {
        self.args.iter().find(|arg| arg.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Arguments that occupy slots in the positional list.
    pub fn positional_args(&self) -> impl Iterator<Item = &ArgSpec> {
        self.args.iter().filter(|arg| !arg.is_settings_bound())
    }

    pub fn single_slot_count(&self) -> usize {
        self.positional_args()
            .filter(|arg| !arg.is_variadic())
            .count()
    }

    pub fn has_variadic(&self) -> bool {
        self.positional_args().any(ArgSpec::is_variadic)
    }

    /// Rejects schemas whose positional encoding would be ambiguous.
    ///
    /// A variadic argument swallows every remaining value, so it must be the
    /// last positional argument; settings-bound blocks may still follow it
    /// because they occupy no slots.
    pub fn validate(&self, owner: &str) -> Result<(), DomainError> {
        let mut names = HashSet::new();
        let mut seen_variadic: Option<&str> = None;
        for arg in &self.args {
            if arg.name.is_empty() {
                return Err(DomainError::schema(owner, "argument names cannot be empty"));
            }
            if !names.insert(arg.name.as_str()) {
                return Err(DomainError::schema(
                    owner,
                    format!("duplicate argument name {:?}", arg.name),
                ));
            }
            match arg.base_type {
                BaseType::NestedBlock => {
                    if arg.is_variadic() {
                        return Err(DomainError::schema(
                            owner,
                            format!("nested block {:?} cannot be variadic", arg.name),
                        ));
                    }
                    if let Some(nested) = &arg.nested_schema {
                        nested.validate(&format!("{owner}.{}", arg.name))?;
                    }
                    continue;
                }
                BaseType::Enum if arg.enum_values.is_empty() => {
                    return Err(DomainError::schema(
                        owner,
                        format!("enum argument {:?} has no labels", arg.name),
                    ));
                }
                _ => {}
            }
            if arg.ui_hint == UiHint::MultiToggle {
                if !arg.is_multi_toggle() {
                    return Err(DomainError::schema(
                        owner,
                        format!("multi-toggle {:?} must be a variadic enum", arg.name),
                    ));
                }
                if let Some(label) = arg.enum_values.iter().find(|label| label.contains('-')) {
                    return Err(DomainError::schema(
                        owner,
                        format!("multi-toggle label {label:?} cannot contain '-'"),
                    ));
                }
            }
            if let Some(variadic) = seen_variadic {
                return Err(DomainError::schema(
                    owner,
                    format!(
                        "argument {:?} follows variadic argument {variadic:?}",
                        arg.name
                    ),
                ));
            }
            if arg.is_variadic() {
                seen_variadic = Some(arg.name.as_str());
            }
        }
        Ok(())
    }
}
