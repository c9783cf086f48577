use crate::error::AppError;

mod file_store;
mod memory;
pub mod task_slot;

pub use file_store::{FileStore, default_store_dir};
pub use memory::MemoryStore;

/// A durable string-keyed slot store. Each `set` replaces the whole value
/// stored under `key`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        (**self).set(key, value)
    }
}
