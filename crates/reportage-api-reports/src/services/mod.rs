//! Supporting services for the reports API.

pub mod export;
pub mod file_storage;

pub use export::{ExportService, EXPORT_CONTENT_TYPE};
pub use file_storage::{is_valid_file_type, FileStore, LocalFileStore};
