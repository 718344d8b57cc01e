pub mod error_logs;
pub mod persons;

pub use error_logs::{ErrorLogEntry, ErrorLogsRepo};
pub use persons::{BatchInsert, PersonsRepo};
