use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracker_core::config::Palette;
use tracker_core::lifecycle::{available_actions, comment_editable};
use tracker_core::model::{format_clock_time, format_date};
use tracker_core::views::HistoryDay;
use tracker_core::{AppError, Task, TaskStatus};

pub const EMPTY_TODAY: &str = "No tasks yet. Add your first task!";
pub const EMPTY_LIST: &str = "No tasks stored.";
pub const EMPTY_HISTORY: &str = "No completed tasks from earlier days.";

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Created")]
    date: String,
    #[tabled(rename = "Comment")]
    comment: String,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            status: task.status.label(),
            description: task.description.clone(),
            time: time_range(task),
            date: format_date(task.date),
            comment: task.comment.clone().unwrap_or_default(),
        }
    }
}

fn time_range(task: &Task) -> String {
    match (task.start_time, task.end_time) {
        (Some(start), Some(end)) => {
            format!("{}-{}", format_clock_time(start), format_clock_time(end))
        }
        _ => "-".to_string(),
    }
}

pub fn task_table(tasks: &[Task]) -> String {
    let rows: Vec<TaskRow> = tasks.iter().map(TaskRow::from).collect();
    Table::new(rows).with(Style::sharp()).to_string()
}

pub fn status_text(status: TaskStatus, palette: &Palette) -> String {
    let colour = match status {
        TaskStatus::Todo => palette.todo,
        TaskStatus::InProgress => palette.in_progress,
        TaskStatus::Completed => palette.completed,
    };
    palette.paint(colour, status.label())
}

pub fn task_details(task: &Task, palette: &Palette) -> String {
    let mut lines = vec![
        format!("ID: {}", task.id),
        format!("Description: {}", task.description),
        format!("Status: {}", status_text(task.status, palette)),
        format!("Created: {}", format_date(task.date)),
        format!("Time: {}", time_range(task)),
    ];
    if let Some(completed_at) = task.completed_at {
        lines.push(format!("Completed: {}", format_date(completed_at)));
    }
    if let Some(comment) = task.comment.as_deref() {
        lines.push(format!("Comment: {comment}"));
    }

    let mut actions: Vec<&str> = available_actions(task.status)
        .into_iter()
        .map(|action| action.name())
        .collect();
    if comment_editable(task.status) {
        actions.push("comment");
    }
    lines.push(format!("Actions: {}", actions.join(", ")));
    lines.join("\n")
}

pub fn history_text(days: &[HistoryDay]) -> String {
    if days.is_empty() {
        return EMPTY_HISTORY.to_string();
    }

    days.iter()
        .map(|day| format!("{}\n{}", format_date(day.date), task_table(&day.tasks)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value).map_err(|err| AppError::invalid_data(err.to_string()))
}
