use anyhow::{Context, Result};
use tracing::{info, warn};
use woodshed_domain::ScheduleDocument;
use woodshed_features::FeatureRegistry;
use woodshed_formats::{JsonCodec, ParseReport, ScheduleCodec};

use crate::store::KeyValueStore;

pub const LAST_SCHEDULE_KEY: &str = "last_schedule";

/// Keeps the most recently committed schedule in a [`KeyValueStore`].
pub struct ScheduleArchive<'a, S> {
    store: S,
    codec: JsonCodec<'a>,
}

impl<'a, S: KeyValueStore> ScheduleArchive<'a, S> {
    pub fn new(store: S, registry: &'a FeatureRegistry) -> Self {
        Self {
            store,
            codec: JsonCodec::new(registry),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn commit(&mut self, document: &ScheduleDocument) -> Result<()> {
        let json = self
            .codec
            .serialize(document)
            .context("serializing schedule")?;
        self.store
            .put(LAST_SCHEDULE_KEY, &json)
            .context("committing schedule")?;
        info!(name = %document.name, rows = document.len(), "schedule committed");
        Ok(())
    }

    /// The last committed schedule, or `None` if nothing was committed yet.
    pub fn restore(&self) -> Result<Option<ParseReport>> {
        let Some(json) = self.store.get(LAST_SCHEDULE_KEY)? else {
            return Ok(None);
        };
        let report = self
            .codec
            .parse(&json)
            .context("reading the last committed schedule")?;
        if !report.warnings.is_empty() {
            warn!(
                skipped = report.warnings.len(),
                "last schedule restored with skipped items"
            );
        }
        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};
    use woodshed_domain::{GroupRow, IntervalRow};
    use woodshed_features::builtin_registry;

    fn sample(registry: &FeatureRegistry) -> ScheduleDocument {
        let mut doc = ScheduleDocument::new("Sunday");
        doc.push(GroupRow::new(1, "Warmup").unwrap());
        doc.push(
            IntervalRow::new(registry.default_settings("Guitar").unwrap())
                .with_duration("5:00")
                .with_task("Scales")
                .with_feature("Scale", ["E", "Aeolian", "1-2"]),
        );
        doc
    }

    #[test]
    fn restore_before_commit_is_empty() {
        let registry = builtin_registry().unwrap();
        let archive = ScheduleArchive::new(MemoryStore::new(), &registry);
        assert!(archive.restore().unwrap().is_none());
    }

    #[test]
    fn commit_then_restore() {
        let registry = builtin_registry().unwrap();
        let mut archive = ScheduleArchive::new(MemoryStore::new(), &registry);
        let doc = sample(&registry);
        archive.commit(&doc).unwrap();
        let restored = archive.restore().unwrap().unwrap();
        assert!(restored.warnings.is_empty());
        assert_eq!(restored.document, doc);
    }

    #[test]
    fn file_backed_archive_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let registry = builtin_registry().unwrap();
        let doc = sample(&registry);
        ScheduleArchive::new(FileStore::new(dir.path()), &registry)
            .commit(&doc)
            .unwrap();

        let reopened = ScheduleArchive::new(FileStore::new(dir.path()), &registry);
        assert_eq!(reopened.restore().unwrap().unwrap().document, doc);
    }

    #[test]
    fn corrupt_archive_is_an_error() {
        let registry = builtin_registry().unwrap();
        let mut store = MemoryStore::new();
        store.put(LAST_SCHEDULE_KEY, "{broken").unwrap();
        let archive = ScheduleArchive::new(store, &registry);
        assert!(archive.restore().is_err());
    }
}
