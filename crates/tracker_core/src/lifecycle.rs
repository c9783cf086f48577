use crate::model::{Task, TaskStatus};
use time::Date;

/// A status change a front end can offer as a one-click action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    Start,
    Complete,
    Reopen,
}

impl StatusAction {
    pub fn target(self) -> TaskStatus {
        match self {
            Self::Start => TaskStatus::InProgress,
            Self::Complete => TaskStatus::Completed,
            Self::Reopen => TaskStatus::Todo,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Complete => "complete",
            Self::Reopen => "reopen",
        }
    }
}

/// Moves `task` to `status`. Any transition is allowed.
///
/// Entering `Completed` stamps `completed_at` with `today` unless a stamp
/// is already present. No transition ever clears the stamp, so a task
/// reopened and completed again keeps its first completion date.
pub fn apply_status(task: &mut Task, status: TaskStatus, today: Date) {
    task.status = status;
    if status == TaskStatus::Completed && task.completed_at.is_none() {
        task.completed_at = Some(today);
    }
}

pub fn available_actions(status: TaskStatus) -> Vec<StatusAction> {
    let mut actions = Vec::new();
    if status != TaskStatus::InProgress {
        actions.push(StatusAction::Start);
    }
    if status != TaskStatus::Completed {
        actions.push(StatusAction::Complete);
    }
    if status != TaskStatus::Todo {
        actions.push(StatusAction::Reopen);
    }
    actions
}

/// Whether a front end should let the user edit the comment. The store
/// itself accepts comment edits in any status.
pub fn comment_editable(status: TaskStatus) -> bool {
    status == TaskStatus::InProgress
}
