pub mod duration;
pub mod error;
pub mod grouping;
pub mod rows;
pub mod schema;
pub mod settings;

pub use crate::duration::{format_duration, parse_duration, DEFAULT_DURATION};
pub use crate::error::DomainError;
pub use crate::grouping::{compute_indents, indent_levels};
pub use crate::rows::{GroupRow, IntervalRow, ScheduleDocument, ScheduleRow};
pub use crate::schema::{ArgSpec, Arity, BaseType, ConfigurationSchema, UiHint};
pub use crate::settings::{EmptySettings, IntervalSettings};
