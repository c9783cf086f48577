use super::KeyValueStore;
use crate::error::AppError;
use crate::model::Task;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Slot key the task list is stored under.
pub const TASKS_KEY: &str = "tasks";

/// Reads the task list, failing on malformed content. An absent slot is an
/// empty list.
pub fn try_load_tasks<S: KeyValueStore + ?Sized>(slot: &S) -> Result<Vec<Task>, AppError> {
    let Some(content) = slot.get(TASKS_KEY)? else {
        return Ok(Vec::new());
    };

    let tasks: Vec<Task> =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;
    validate_tasks(&tasks)?;

    debug!(count = tasks.len(), "loaded tasks");
    Ok(tasks)
}

/// Reads the task list, treating any read or shape failure as an empty
/// list so that a corrupt slot never blocks startup.
pub fn load_tasks<S: KeyValueStore + ?Sized>(slot: &S) -> Vec<Task> {
    match try_load_tasks(slot) {
        Ok(tasks) => tasks,
        Err(err) => {
            warn!(error = %err, "discarding unreadable task list");
            Vec::new()
        }
    }
}

pub fn save_tasks<S: KeyValueStore + ?Sized>(slot: &mut S, tasks: &[Task]) -> Result<(), AppError> {
    let content =
        serde_json::to_string(tasks).map_err(|err| AppError::invalid_data(err.to_string()))?;
    slot.set(TASKS_KEY, &content)?;

    debug!(count = tasks.len(), "saved tasks");
    Ok(())
}

/// Next id to hand out for `tasks`: one past the largest id, or 1. `None`
/// once the largest id is `u64::MAX`.
pub fn next_id(tasks: &[Task]) -> Option<u64> {
    match tasks.iter().map(|task| task.id).max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

fn validate_tasks(tasks: &[Task]) -> Result<(), AppError> {
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if task.id == 0 {
            return Err(AppError::invalid_data("task id must be positive"));
        }
        if !seen.insert(task.id) {
            return Err(AppError::invalid_data(format!(
                "duplicate task id {}",
                task.id
            )));
        }
        if task.description.trim().is_empty() {
            return Err(AppError::invalid_data(format!(
                "task {} has an empty description",
                task.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{TASKS_KEY, load_tasks, next_id, save_tasks, try_load_tasks};
    use crate::model::{Task, TaskStatus};
    use crate::storage::MemoryStore;
    use time::macros::{date, time};

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task {
                id: 4,
                description: "buy milk".to_string(),
                start_time: Some(time!(9:00)),
                end_time: Some(time!(10:00)),
                status: TaskStatus::Completed,
                date: date!(2023 - 12 - 31),
                completed_at: Some(date!(2024 - 01 - 01)),
                comment: Some("oat".to_string()),
            },
            Task {
                id: 2,
                description: "write report".to_string(),
                start_time: None,
                end_time: None,
                status: TaskStatus::InProgress,
                date: date!(2024 - 01 - 02),
                completed_at: None,
                comment: None,
            },
        ]
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut slot = MemoryStore::new();
        let tasks = sample_tasks();

        save_tasks(&mut slot, &tasks).unwrap();
        let loaded = try_load_tasks(&slot).unwrap();

        assert_eq!(loaded, tasks);
    }

    #[test]
    fn saved_document_uses_wire_field_names() {
        let mut slot = MemoryStore::new();
        save_tasks(&mut slot, &sample_tasks()).unwrap();

        let stored: serde_json::Value =
            serde_json::from_str(slot.raw(TASKS_KEY).unwrap()).unwrap();

        assert_eq!(stored[0]["startTime"], "09:00");
        assert_eq!(stored[0]["completedAt"], "2024-01-01");
        assert_eq!(stored[1]["status"], "in-progress");
        assert!(stored[1].get("comment").is_none());
    }

    #[test]
    fn absent_slot_loads_empty() {
        let slot = MemoryStore::new();
        assert!(try_load_tasks(&slot).unwrap().is_empty());
        assert!(load_tasks(&slot).is_empty());
    }

    #[test]
    fn corrupt_slot_loads_empty() {
        for raw in [
            "{ not json",
            "{\"id\": 1}",
            "[{\"id\": 1, \"description\": \"demo\"}]",
            "[{\"id\": 1, \"description\": \"demo\", \"status\": \"done\", \"date\": \"2024-01-02\"}]",
            "[{\"id\": \"1\", \"description\": \"demo\", \"status\": \"todo\", \"date\": \"2024-01-02\"}]",
            "[{\"id\": 1, \"description\": \"demo\", \"status\": \"todo\", \"date\": \"2024-01-02\", \"startTime\": \"9am\"}]",
            "null",
        ] {
            let slot = MemoryStore::with_entry(TASKS_KEY, raw);

            let err = try_load_tasks(&slot).unwrap_err();
            assert_eq!(err.code(), "invalid_data", "input: {raw}");
            assert!(load_tasks(&slot).is_empty(), "input: {raw}");
        }
    }

    #[test]
    fn duplicate_ids_are_corrupt() {
        let raw = r#"[
            {"id": 1, "description": "a", "status": "todo", "date": "2024-01-02"},
            {"id": 1, "description": "b", "status": "todo", "date": "2024-01-02"}
        ]"#;
        let slot = MemoryStore::with_entry(TASKS_KEY, raw);

        let err = try_load_tasks(&slot).unwrap_err();
        assert!(err.message().contains("duplicate"));
        assert!(load_tasks(&slot).is_empty());
    }

    #[test]
    fn blank_description_is_corrupt() {
        let raw = r#"[{"id": 1, "description": "  ", "status": "todo", "date": "2024-01-02"}]"#;
        let slot = MemoryStore::with_entry(TASKS_KEY, raw);

        assert!(load_tasks(&slot).is_empty());
    }

    #[test]
    fn save_reports_write_failure() {
        let mut slot = MemoryStore::new();
        slot.fail_writes = true;

        let err = save_tasks(&mut slot, &sample_tasks()).unwrap_err();

        assert_eq!(err.code(), "io_error");
        assert!(err.is_persistence());
    }

    #[test]
    fn next_id_follows_largest_existing_id() {
        assert_eq!(next_id(&[]), Some(1));
        assert_eq!(next_id(&sample_tasks()), Some(5));
    }

    #[test]
    fn max_id_document_loads_and_exhausts_counter() {
        let raw = r#"[{"id": 18446744073709551615, "description": "a", "status": "todo", "date": "2024-01-01"}]"#;
        let slot = MemoryStore::with_entry(TASKS_KEY, raw);

        let loaded = load_tasks(&slot);

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, u64::MAX);
        assert_eq!(next_id(&loaded), None);
    }

    #[test]
    fn unreadable_slot_loads_empty() {
        let mut slot = MemoryStore::with_entry(TASKS_KEY, "[]");
        slot.fail_reads = true;

        let err = try_load_tasks(&slot).unwrap_err();
        assert_eq!(err.code(), "io_error");
        assert!(load_tasks(&slot).is_empty());
    }
}
