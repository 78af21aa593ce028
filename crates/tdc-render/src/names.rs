use serde::Serialize;

use tdc_core::model::{Label, Project, Section};
use tdc_core::sanitize::maybe_strip;

use crate::table::Table;
use crate::RenderError;

#[derive(Debug, Serialize)]
struct NameEntry {
    id: String,
    name: String,
}

fn entries<'a>(items: impl Iterator<Item = (&'a str, &'a str)>, strip_emojis: bool) -> Vec<NameEntry> {
    items
        .map(|(id, name)| NameEntry {
            id: id.to_string(),
            name: maybe_strip(name, strip_emojis),
        })
        .collect()
}

fn name_table(entries: &[NameEntry], show_ids: bool) -> String {
    let mut table = if show_ids {
        Table::new(["ID", "Name"])
    } else {
        Table::new(["Name"])
    };
    for entry in entries {
        let row = if show_ids {
            vec![entry.id.clone(), entry.name.clone()]
        } else {
            vec![entry.name.clone()]
        };
        table.push_row(row);
    }
    table.render()
}

pub fn projects_table(projects: &[Project], show_ids: bool, strip_emojis: bool) -> String {
    let items = projects.iter().map(|p| (p.id.as_str(), p.name.as_str()));
    name_table(&entries(items, strip_emojis), show_ids)
}

pub fn projects_json(projects: &[Project], strip_emojis: bool) -> Result<String, RenderError> {
    let items = projects.iter().map(|p| (p.id.as_str(), p.name.as_str()));
    Ok(serde_json::to_string_pretty(&entries(items, strip_emojis))?)
}

pub fn sections_table(sections: &[Section], show_ids: bool, strip_emojis: bool) -> String {
    let items = sections.iter().map(|s| (s.id.as_str(), s.name.as_str()));
    name_table(&entries(items, strip_emojis), show_ids)
}

pub fn sections_json(sections: &[Section], strip_emojis: bool) -> Result<String, RenderError> {
    let items = sections.iter().map(|s| (s.id.as_str(), s.name.as_str()));
    Ok(serde_json::to_string_pretty(&entries(items, strip_emojis))?)
}

pub fn labels_table(labels: &[Label], show_ids: bool, strip_emojis: bool) -> String {
    let items = labels.iter().map(|l| (l.id.as_str(), l.name.as_str()));
    name_table(&entries(items, strip_emojis), show_ids)
}

pub fn labels_json(labels: &[Label], strip_emojis: bool) -> Result<String, RenderError> {
    let items = labels.iter().map(|l| (l.id.as_str(), l.name.as_str()));
    Ok(serde_json::to_string_pretty(&entries(items, strip_emojis))?)
}
