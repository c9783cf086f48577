//! Derived read views over a store snapshot. Pure functions of the task
//! list and the caller's notion of "today".

use crate::model::{Task, TaskStatus};
use serde::Serialize;
use std::collections::BTreeMap;
use time::Date;

time::serde::format_description!(calendar_date, Date, "[year]-[month]-[day]");

/// Completed tasks sharing one completion date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryDay {
    #[serde(serialize_with = "calendar_date::serialize")]
    pub date: Date,
    pub tasks: Vec<Task>,
}

/// Tasks created on `today`, in insertion order.
pub fn today(tasks: &[Task], today: Date) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.date == today)
        .cloned()
        .collect()
}

/// Tasks completed before or after `today` (but not on it), grouped by
/// completion date with the most recent date first.
pub fn history(tasks: &[Task], today: Date) -> Vec<HistoryDay> {
    let mut grouped: BTreeMap<Date, Vec<Task>> = BTreeMap::new();
    for task in tasks {
        if task.status != TaskStatus::Completed {
            continue;
        }
        let Some(completed_at) = task.completed_at else {
            continue;
        };
        if completed_at == today {
            continue;
        }
        grouped.entry(completed_at).or_default().push(task.clone());
    }

    grouped
        .into_iter()
        .rev()
        .map(|(date, tasks)| HistoryDay { date, tasks })
        .collect()
}
