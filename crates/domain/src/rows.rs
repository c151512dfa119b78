use crate::grouping;
use crate::settings::IntervalSettings;
use crate::DomainError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupRow {
    pub level: u32,
    pub name: String,
}

impl GroupRow {
    pub fn new(level: u32, name: impl Into<String>) -> Result<Self, DomainError> {
        if level == 0 {
            return Err(DomainError::validation("group level must be at least 1"));
        }
        Ok(Self {
            level,
            name: name.into(),
        })
    }
}

/// One timed line of a schedule.
///
/// The feature type is not checked on construction: a row may reference a
/// type the registry no longer knows, in which case its arguments stay opaque.
#[derive(Clone, Debug)]
pub struct IntervalRow {
    pub duration: String,
    pub task: String,
    pub category_name: String,
    pub feature_type_name: String,
    pub args: Vec<String>,
    pub settings: Box<dyn IntervalSettings>,
}

impl IntervalRow {
    pub fn new(settings: Box<dyn IntervalSettings>) -> Self {
        Self {
            duration: crate::duration::DEFAULT_DURATION.to_string(),
            task: String::new(),
            category_name: settings.category().to_string(),
            feature_type_name: String::new(),
            args: Vec::new(),
            settings,
        }
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = duration.into();
        self
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = task.into();
        self
    }

    pub fn with_feature<I, S>(mut self, feature_type: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feature_type_name = feature_type.into();
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_feature(&self) -> bool {
        !self.feature_type_name.is_empty()
    }
}

impl PartialEq for IntervalRow {
    fn eq(&self, other: &Self) -> bool {
        self.duration == other.duration
            && self.task == other.task
            && self.category_name == other.category_name
            && self.feature_type_name == other.feature_type_name
            && self.args == other.args
            && *self.settings == *other.settings
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ScheduleRow {
    Group(GroupRow),
    Interval(IntervalRow),
}

impl ScheduleRow {
    pub fn as_group(&self) -> Option<&GroupRow> {
        match self {
            ScheduleRow::Group(group) => Some(group),
            ScheduleRow::Interval(_) => None,
        }
    }

    pub fn as_interval(&self) -> Option<&IntervalRow> {
        match self {
            ScheduleRow::Interval(interval) => Some(interval),
            ScheduleRow::Group(_) => None,
        }
    }

    pub fn as_interval_mut(&mut self) -> Option<&mut IntervalRow> {
        match self {
            ScheduleRow::Interval(interval) => Some(interval),
            ScheduleRow::Group(_) => None,
        }
    }

    /// Group level, or `None` for interval rows.
    pub fn group_level(&self) -> Option<u32> {
        self.as_group().map(|group| group.level)
    }
}

impl From<GroupRow> for ScheduleRow {
    fn from(row: GroupRow) -> Self {
        ScheduleRow::Group(row)
    }
}

impl From<IntervalRow> for ScheduleRow {
    fn from(row: IntervalRow) -> Self {
        ScheduleRow::Interval(row)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScheduleDocument {
    pub name: String,
    pub items: Vec<ScheduleRow>,
}

impl ScheduleDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, row: impl Into<ScheduleRow>) {
        self.items.push(row.into());
    }

    /// Inserts at `index`, appending when the index is past the end.
    pub fn insert(&mut self, index: usize, row: impl Into<ScheduleRow>) {
        let index = index.min(self.items.len());
        self.items.insert(index, row.into());
    }

    pub fn remove(&mut self, index: usize) -> Option<ScheduleRow> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Moves the row at `from` so that it ends up at position `to`.
    pub fn move_row(&mut self, from: usize, to: usize) -> bool {
        if from >= self.items.len() || to >= self.items.len() {
            return false;
        }
        let row = self.items.remove(from);
        self.items.insert(to, row);
        true
    }

    /// Starts a new, empty schedule.
    pub fn reset(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.items.clear();
    }

    pub fn intervals(&self) -> impl Iterator<Item = (usize, &IntervalRow)> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(index, row)| row.as_interval().map(|interval| (index, interval)))
    }

    /// Indentation of every row; recompute after any structural edit.
    pub fn indents(&self) -> Vec<u32> {
        grouping::compute_indents(&self.items)
    }

    /// Names of the groups still open above the row at `index`, outermost first.
    pub fn group_path(&self, index: usize) -> Vec<&str> {
        grouping::open_groups(&self.items, index)
            .into_iter()
            .map(|group| group.name.as_str())
            .collect()
    }

    /// Human readable label for the row at `index`, used in error messages.
    pub fn label(&self, index: usize) -> String {
        let own = match self.items.get(index) {
            Some(ScheduleRow::Interval(row)) if !row.task.is_empty() => row.task.clone(),
            Some(ScheduleRow::Group(group)) => group.name.clone(),
            _ => format!("interval #{}", index + 1),
        };
        let mut path = self.group_path(index);
        path.push(&own);
        path.join(" / ")
    }
}
