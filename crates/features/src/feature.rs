use std::fmt;

use time::Duration;
use woodshed_domain::IntervalSettings;

use crate::codec::FeatureArgs;

/// A configured exercise, ready to be handed to the runtime that plays a
/// schedule.
pub trait Feature: fmt::Debug + Send {
    fn type_name(&self) -> &str;

    /// One-line description shown in schedule summaries.
    fn summary(&self) -> String;
}

/// What a factory may look at besides its decoded arguments.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeContext<'a> {
    pub interval_index: usize,
    pub duration: Duration,
    pub settings: &'a dyn IntervalSettings,
}

pub type FeatureFactory =
    fn(&FeatureArgs, &RuntimeContext<'_>) -> anyhow::Result<Box<dyn Feature>>;
