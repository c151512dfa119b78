pub mod error;
pub mod schedule;

pub use error::BuildError;
pub use schedule::{BuildLimits, BuiltInterval, BuiltSchedule, ScheduleBuilder};
