mod task;

pub use task::{Task, TaskStatus, format_clock_time, format_date, parse_clock_time, parse_date};
