//! Plain-text and JSON rendering for `tdc` output.

mod names;
mod table;
mod tasks;

use thiserror::Error;

pub use names::{labels_json, labels_table, projects_json, projects_table, sections_json, sections_table};
pub use table::Table;
pub use tasks::{task_entries, tasks_json, tasks_table, TaskEntry};

/// Placeholder for values that are absent.
pub const NA: &str = "N/A";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),
}
