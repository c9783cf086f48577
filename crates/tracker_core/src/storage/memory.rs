use super::KeyValueStore;
use crate::error::AppError;
use std::collections::HashMap;

/// In-process slot store. `fail_writes` makes every `set` fail the way a
/// full browser quota would; `fail_reads` makes every `get` fail.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::default();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        if self.fail_reads {
            return Err(AppError::io(format!("storage unavailable reading '{key}'")));
        }
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        if self.fail_writes {
            return Err(AppError::io(format!("quota exceeded writing '{key}'")));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
