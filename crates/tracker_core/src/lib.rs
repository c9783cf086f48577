//! Core of the task tracker: the task list, its status lifecycle, the
//! day-based views and the durable slot the list is written through to.
//! No rendering concerns live here.

pub mod clock;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod storage;
pub mod store;
pub mod views;

pub use clock::{DateProvider, FixedClock, SystemClock};
pub use error::AppError;
pub use model::{Task, TaskStatus};
pub use store::{NewTask, StoreOptions, TaskStore};

#[cfg(test)]
mod tests {
    use crate::error::AppError;

    #[test]
    fn app_error_exposes_code() {
        assert_eq!(AppError::invalid_input("missing").code(), "invalid_input");
        assert_eq!(AppError::not_found(4).code(), "not_found");
        assert_eq!(AppError::not_found(4).to_string(), "not_found - task 4 not found");
        assert!(AppError::io("disk full").is_persistence());
        assert!(AppError::invalid_data("bad").is_persistence());
        assert!(!AppError::not_found(1).is_persistence());
    }
}
