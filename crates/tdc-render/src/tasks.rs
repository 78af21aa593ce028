use serde::Serialize;

use tdc_core::hierarchy::Snapshot;
use tdc_core::sanitize::maybe_strip;
use tdc_core::views::DisplayRow;

use crate::table::Table;
use crate::{RenderError, NA};

/// A display row with every reference resolved to a printable name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskEntry {
    pub id: String,
    /// Id for the ID column; absent unless the row carried one.
    #[serde(skip)]
    pub shown_id: Option<String>,
    pub content: String,
    pub project: Option<String>,
    pub section: Option<String>,
    pub parent: Option<String>,
    pub priority: Option<u8>,
    pub due: Option<String>,
    pub depth: usize,
}

pub fn task_entries(snapshot: &Snapshot, rows: &[DisplayRow<'_>], strip_emojis: bool) -> Vec<TaskEntry> {
    let clean = |text: &str| maybe_strip(text, strip_emojis);
    rows.iter()
        .map(|row| {
            let task = row.task;
            TaskEntry {
                id: task.id.clone(),
                shown_id: row.id.map(str::to_string),
                content: row.title.clone(),
                project: snapshot.project(&task.project_id).map(|p| clean(&p.name)),
                section: task
                    .section()
                    .and_then(|id| snapshot.section(id))
                    .filter(|section| !section.is_unnamed())
                    .map(|section| clean(&section.name)),
                parent: task
                    .parent()
                    .and_then(|id| snapshot.task(id))
                    .map(|parent| clean(&parent.title)),
                priority: task.priority,
                due: task
                    .due
                    .as_ref()
                    .map(|due| clean(due.label()))
                    .filter(|label| !label.is_empty()),
                depth: row.depth,
            }
        })
        .collect()
}

/// Text table for a task listing. Subtasks are indented by depth; the ID
/// column appears when the rows carry ids.
pub fn tasks_table(entries: &[TaskEntry], show_subtasks: bool) -> String {
    let show_ids = entries.iter().any(|entry| entry.shown_id.is_some());
    let show_sections = entries.iter().any(|entry| entry.section.is_some());

    let mut headers = Vec::new();
    if show_ids {
        headers.push("ID");
    }
    headers.push("Content");
    if show_subtasks {
        headers.push("Parent Task");
    }
    headers.push("Project");
    if show_sections {
        headers.push("Section");
    }
    headers.extend(["Priority", "Due"]);

    let mut table = Table::new(headers);
    for entry in entries {
        let mut row = Vec::new();
        if show_ids {
            row.push(entry.shown_id.clone().unwrap_or_default());
        }
        row.push(format!("{}{}", "  ".repeat(entry.depth), entry.content));
        if show_subtasks {
            row.push(or_na(entry.parent.as_deref()));
        }
        row.push(or_na(entry.project.as_deref()));
        if show_sections {
            row.push(or_na(entry.section.as_deref()));
        }
        row.push(entry.priority.map(|p| p.to_string()).unwrap_or_else(|| NA.to_string()));
        row.push(or_na(entry.due.as_deref()));
        table.push_row(row);
    }
    table.render()
}

pub fn tasks_json(entries: &[TaskEntry]) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(entries)?)
}

fn or_na(value: Option<&str>) -> String {
    value.unwrap_or(NA).to_string()
}
