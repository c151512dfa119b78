use time::Duration;
use tracing::{debug, info, instrument};
use woodshed_domain::{format_duration, parse_duration, DomainError, IntervalRow, ScheduleDocument};
use woodshed_features::{codec, Feature, FeatureRegistry, RuntimeContext};

use crate::BuildError;

/// Upper bounds applied while building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildLimits {
    pub max_total: Duration,
}

impl BuildLimits {
    pub fn from_minutes(minutes: u32) -> Self {
        Self {
            max_total: Duration::minutes(i64::from(minutes)),
        }
    }
}

impl Default for BuildLimits {
    fn default() -> Self {
        Self {
            max_total: Duration::hours(3),
        }
    }
}

#[derive(Debug)]
pub struct BuiltInterval {
    /// Row index in the source document.
    pub index: usize,
    pub label: String,
    pub indent: u32,
    /// Offset from the start of the schedule.
    pub start: Duration,
    pub duration: Duration,
    pub category_name: String,
    pub feature: Option<Box<dyn Feature>>,
}

impl BuiltInterval {
    pub fn summary(&self) -> String {
        match &self.feature {
            Some(feature) => format!("{} [{}]", self.label, feature.summary()),
            None => self.label.clone(),
        }
    }
}

/// A document whose intervals all passed validation, in playing order.
#[derive(Debug)]
pub struct BuiltSchedule {
    pub name: String,
    pub intervals: Vec<BuiltInterval>,
    pub total: Duration,
}

impl BuiltSchedule {
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

pub struct ScheduleBuilder<'a> {
    registry: &'a FeatureRegistry,
    limits: BuildLimits,
}

impl<'a> ScheduleBuilder<'a> {
    pub fn new(registry: &'a FeatureRegistry) -> Self {
        Self {
            registry,
            limits: BuildLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: BuildLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> BuildLimits {
        self.limits
    }

    /// Validates every interval of `document` and instantiates its feature.
    ///
    /// Stops at the first failing interval; nothing is returned for the
    /// intervals that were already built.
    #[instrument(skip(self, document), fields(name = %document.name, rows = document.len()))]
    pub fn build(&self, document: &ScheduleDocument) -> Result<BuiltSchedule, BuildError> {
        let indents = document.indents();
        let mut intervals = Vec::new();
        let mut total = Duration::ZERO;
        for (index, row) in document.intervals() {
            let label = document.label(index);
            let duration = interval_duration(index, &label, &row.duration)?;
            let start = total;
            total = match total.checked_add(duration) {
                Some(sum) if sum <= self.limits.max_total => sum,
                sum => {
                    return Err(BuildError::TotalDurationExceeded {
                        index,
                        label,
                        total: sum.unwrap_or(Duration::MAX),
                        limit: self.limits.max_total,
                    })
                }
            };
            let feature = self.instantiate(index, &label, row, duration)?;
            debug!(index, %label, start = %format_duration(start), "interval built");
            intervals.push(BuiltInterval {
                index,
                label,
                indent: indents[index],
                start,
                duration,
                category_name: row.category_name.clone(),
                feature,
            });
        }
        info!(
            intervals = intervals.len(),
            total = %format_duration(total),
            "schedule built"
        );
        Ok(BuiltSchedule {
            name: document.name.clone(),
            intervals,
            total,
        })
    }

    fn instantiate(
        &self,
        index: usize,
        label: &str,
        row: &IntervalRow,
        duration: Duration,
    ) -> Result<Option<Box<dyn Feature>>, BuildError> {
        if !row.has_feature() {
            return Ok(None);
        }
        let category =
            self.registry
                .category(&row.category_name)
                .ok_or_else(|| BuildError::UnknownCategory {
                    index,
                    label: label.to_string(),
                    category: row.category_name.clone(),
                })?;
        let descriptor = category
            .feature_type(&row.feature_type_name)
            .ok_or_else(|| BuildError::UnknownFeatureType {
                index,
                label: label.to_string(),
                category: row.category_name.clone(),
                feature_type: row.feature_type_name.clone(),
            })?;
        codec::check_arity(&descriptor.schema, &row.args).map_err(|source| {
            BuildError::ArgumentMismatch {
                index,
                label: label.to_string(),
                source,
            }
        })?;
        let args = codec::decode(&descriptor.schema, &row.args, Some(row.settings.as_ref()));
        let context = RuntimeContext {
            interval_index: index,
            duration,
            settings: row.settings.as_ref(),
        };
        let feature = descriptor
            .create(&args, &context)
            .map_err(|err| BuildError::Feature {
                index,
                label: label.to_string(),
                message: format!("{err:#}"),
            })?;
        Ok(Some(feature))
    }
}

fn interval_duration(index: usize, label: &str, value: &str) -> Result<Duration, BuildError> {
    parse_duration(value).map_err(|err| match err {
        DomainError::NegativeDuration(_) => BuildError::NegativeDuration {
            index,
            label: label.to_string(),
            value: value.to_string(),
        },
        _ => BuildError::InvalidDuration {
            index,
            label: label.to_string(),
            value: value.to_string(),
        },
    })
}
