pub mod archive;
pub mod store;

pub use archive::{ScheduleArchive, LAST_SCHEDULE_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore};
