use crate::clock::DateProvider;
use crate::error::AppError;
use crate::lifecycle::apply_status;
use crate::model::{Task, TaskStatus, parse_clock_time};
use crate::storage::KeyValueStore;
use crate::storage::task_slot;
use crate::views::{self, HistoryDay};
use time::Time;
use tracing::warn;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Reject new tasks that lack a start and end time.
    pub require_schedule: bool,
}

/// Input for [`TaskStore::add`]. Times are raw `HH:MM` strings.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub description: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub comment: Option<String>,
}

impl NewTask {
    pub fn new<D: Into<String>>(description: D) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn scheduled<D: Into<String>>(description: D, start: &str, end: &str) -> Self {
        Self {
            description: description.into(),
            start_time: Some(start.to_string()),
            end_time: Some(end.to_string()),
            comment: None,
        }
    }

    pub fn with_comment<C: Into<String>>(mut self, comment: C) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// The in-memory task list, written through to a durable slot after every
/// mutation.
pub struct TaskStore<S, C> {
    tasks: Vec<Task>,
    /// `None` once every id has been handed out.
    next_id: Option<u64>,
    slot: S,
    clock: C,
    options: StoreOptions,
    persist_error: Option<AppError>,
}

impl<S: KeyValueStore, C: DateProvider> TaskStore<S, C> {
    /// Loads whatever the slot holds. Unreadable content starts the store
    /// empty instead of failing.
    pub fn open(slot: S, clock: C, options: StoreOptions) -> Self {
        let tasks = task_slot::load_tasks(&slot);
        let next_id = task_slot::next_id(&tasks);
        Self {
            tasks,
            next_id,
            slot,
            clock,
            options,
            persist_error: None,
        }
    }

    pub fn add(&mut self, new_task: NewTask) -> Result<Task, AppError> {
        let description = new_task.description.trim();
        if description.is_empty() {
            return Err(AppError::invalid_input("description is required"));
        }

        let (start_time, end_time) = self.schedule(
            new_task.start_time.as_deref(),
            new_task.end_time.as_deref(),
        )?;
        let comment = new_task
            .comment
            .filter(|comment| !comment.trim().is_empty());
        let id = self
            .next_id
            .ok_or_else(|| AppError::invalid_input("no task ids left"))?;

        let task = Task {
            id,
            description: description.to_string(),
            start_time,
            end_time,
            status: TaskStatus::Todo,
            date: self.clock.today(),
            completed_at: None,
            comment,
        };

        self.next_id = id.checked_add(1);
        self.tasks.push(task.clone());
        self.persist();

        Ok(task)
    }

    pub fn set_status(&mut self, id: u64, status: TaskStatus) -> Result<Task, AppError> {
        let today = self.clock.today();
        let task = self.find_mut(id)?;
        apply_status(task, status, today);
        let updated = task.clone();
        self.persist();

        Ok(updated)
    }

    /// Replaces the comment whatever the task's status. Blank text clears it.
    pub fn set_comment(&mut self, id: u64, text: &str) -> Result<Task, AppError> {
        let task = self.find_mut(id)?;
        task.comment = if text.trim().is_empty() {
            None
        } else {
            Some(text.to_string())
        };
        let updated = task.clone();
        self.persist();

        Ok(updated)
    }

    pub fn remove(&mut self, id: u64) -> Result<Task, AppError> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| AppError::not_found(id))?;

        let removed = self.tasks.remove(index);
        self.persist();

        Ok(removed)
    }

    pub fn get(&self, id: u64) -> Result<&Task, AppError> {
        self.tasks
            .iter()
            .find(|task| task.id == id)
            .ok_or_else(|| AppError::not_found(id))
    }

    pub fn snapshot(&self) -> &[Task] {
        &self.tasks
    }

    pub fn today_view(&self) -> Vec<Task> {
        views::today(&self.tasks, self.clock.today())
    }

    pub fn history_view(&self) -> Vec<HistoryDay> {
        views::history(&self.tasks, self.clock.today())
    }

    /// The failure from the most recent save, if it failed.
    pub fn persist_error(&self) -> Option<&AppError> {
        self.persist_error.as_ref()
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    pub fn slot_mut(&mut self) -> &mut S {
        &mut self.slot
    }

    pub fn into_slot(self) -> S {
        self.slot
    }

    fn find_mut(&mut self, id: u64) -> Result<&mut Task, AppError> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| AppError::not_found(id))
    }

    fn schedule(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<(Option<Time>, Option<Time>), AppError> {
        let start = start.filter(|value| !value.trim().is_empty());
        let end = end.filter(|value| !value.trim().is_empty());

        match (start, end) {
            (Some(start), Some(end)) => {
                Ok((Some(parse_clock_time(start)?), Some(parse_clock_time(end)?)))
            }
            (None, None) if !self.options.require_schedule => Ok((None, None)),
            (None, None) => Err(AppError::invalid_input(
                "start time and end time are required",
            )),
            _ => Err(AppError::invalid_input(
                "start time and end time must be given together",
            )),
        }
    }

    fn persist(&mut self) {
        match task_slot::save_tasks(&mut self.slot, &self.tasks) {
            Ok(()) => self.persist_error = None,
            Err(err) => {
                warn!(error = %err, "failed to save tasks; keeping in-memory changes");
                self.persist_error = Some(err);
            }
        }
    }
}
