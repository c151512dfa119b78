use std::fmt;

use serde_json::Value;

use crate::DomainError;

/// Per-interval configuration that lives outside the positional argument list.
///
/// Each category supplies its own implementation together with a factory and a
/// JSON parser registered alongside the category.
pub trait IntervalSettings: fmt::Debug + Send + Sync {
    /// Name of the category this settings object belongs to.
    fn category(&self) -> &str;

    /// JSON form of the settings, or `None` when they equal the default.
    fn to_json(&self) -> Option<Value>;

    fn is_default(&self) -> bool {
        self.to_json().is_none()
    }

    /// Data of the settings-bound argument `name`, if this category has one.
    fn block(&self, _name: &str) -> Option<Value> {
        None
    }

    fn set_block(&mut self, name: &str, _value: Value) -> Result<(), DomainError> {
        Err(DomainError::validation(format!(
            "{} settings have no block named {name:?}",
            self.category()
        )))
    }

    /// Text DSL literal (without the leading `@`), when the settings can be
    /// expressed as one.
    fn literal(&self) -> Option<String> {
        None
    }

    fn clone_box(&self) -> Box<dyn IntervalSettings>;
}

impl Clone for Box<dyn IntervalSettings> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl PartialEq for dyn IntervalSettings {
    fn eq(&self, other: &Self) -> bool {
        self.category() == other.category() && self.to_json() == other.to_json()
    }
}

/// Settings for categories that have nothing to configure per interval.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmptySettings {
    category: String,
}

impl EmptySettings {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
        }
    }
}

impl IntervalSettings for EmptySettings {
    fn category(&self) -> &str {
        &self.category
    }

    fn to_json(&self) -> Option<Value> {
        None
    }

    fn clone_box(&self) -> Box<dyn IntervalSettings> {
        Box::new(self.clone())
    }
}
