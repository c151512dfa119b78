//! Categories shipped with Woodshed.

pub mod general;
pub mod guitar;

use woodshed_domain::DomainError;

use crate::registry::{Category, FeatureRegistry};

pub fn builtin_categories() -> Vec<Category> {
    vec![guitar::category(), general::category()]
}

/// Registry holding every built-in category.
pub fn builtin_registry() -> Result<FeatureRegistry, DomainError> {
    let mut builder = FeatureRegistry::builder();
    for category in builtin_categories() {
        builder.register(category)?;
    }
    Ok(builder.build())
}
