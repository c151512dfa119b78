use crate::rows::{GroupRow, ScheduleRow};

/// Computes the indentation of every row with a single stack pass.
///
/// A group of level `L` closes every open group of level `>= L` (including a
/// sibling at the same level) and is indented by the level left on top of the
/// stack. Interval rows take the current top. Level jumps are accepted as-is.
pub fn compute_indents(rows: &[ScheduleRow]) -> Vec<u32> {
    indent_levels(rows.iter().map(ScheduleRow::group_level))
}

/// Same pass over bare markers: `Some(level)` for a group, `None` otherwise.
pub fn indent_levels<I>(markers: I) -> Vec<u32>
where
    I: IntoIterator<Item = Option<u32>>,
{
    let mut stack: Vec<u32> = vec![0];
    markers
        .into_iter()
        .map(|marker| match marker {
            Some(level) => {
                while stack.len() > 1 && stack.last().is_some_and(|top| *top >= level) {
                    stack.pop();
                }
                let indent = stack.last().copied().unwrap_or(0);
                stack.push(level);
                indent
            }
            None => stack.last().copied().unwrap_or(0),
        })
        .collect()
}

/// Groups still open above the row at `index`, outermost first.
pub fn open_groups(rows: &[ScheduleRow], index: usize) -> Vec<&GroupRow> {
    let mut open: Vec<&GroupRow> = Vec::new();
    for (position, row) in rows.iter().enumerate() {
        if let ScheduleRow::Group(group) = row {
            while open.last().is_some_and(|top| top.level >= group.level) {
                open.pop();
            }
            if position == index {
                break;
            }
            open.push(group);
        } else if position == index {
            break;
        }
    }
    open
}
