//! Command operations against a [`RemoteService`].
//!
//! Every operation resolves user fragments through the resolver before it
//! touches the service, and returns structured outcomes for the caller to print.

use thiserror::Error;
use tracing::{debug, warn};

use crate::due::DueFilter;
use crate::hierarchy::Snapshot;
use crate::matcher::{EntityKind, ResolveError};
use crate::model::{Label, NewTask, Project, Section, Task, TaskUpdate};
use crate::remote::{RemoteError, RemoteService};
use crate::resolve::{
    check_scope_args, resolve_label, resolve_project, resolve_scope, resolve_section, resolve_task,
    scoped_tasks, SectionSlot,
};
use crate::sanitize::strip;
use crate::views::{render, DisplayRow, ViewOptions};

#[derive(Debug, Error)]
pub enum OpsError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("{0}")]
    InvalidInput(String),
}

/// Flat option record handed over by the argument layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub project: Option<String>,
    pub section: Option<String>,
    pub show_ids: bool,
    pub show_subtasks: bool,
    pub strip_emojis: bool,
    pub due: DueFilter,
}

impl ListOptions {
    /// Checks that need no remote data; run before any fetch.
    pub fn validate(&self) -> Result<(), OpsError> {
        check_scope_args(self.project.as_deref(), self.section.as_deref())?;
        Ok(())
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            show_ids: self.show_ids,
            show_subtasks: self.show_subtasks,
            strip_emojis: self.strip_emojis,
            due: self.due,
        }
    }
}

/// Identifies one open task by title fragment, optionally narrowed by project and section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskTarget {
    pub project: Option<String>,
    pub section: Option<String>,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub project: Option<String>,
    pub section: Option<String>,
    pub priority: Option<u8>,
    pub due: Option<String>,
    pub reminder: Option<String>,
    pub force: bool,
}

#[derive(Debug)]
pub enum TaskCreateOutcome {
    /// `reminder` is `None` when no reminder was requested.
    Created {
        task: Task,
        reminder: Option<Result<(), RemoteError>>,
    },
    AlreadyExists(Task),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome<T> {
    Created(T),
    AlreadyExists(T),
}

/// Fetch projects, sections and tasks and assemble them once.
pub fn load_snapshot(remote: &dyn RemoteService) -> Result<Snapshot, OpsError> {
    let projects = remote.fetch_projects()?;
    let sections = remote.fetch_sections()?;
    let tasks = remote.fetch_tasks()?;
    Ok(Snapshot::build(projects, sections, tasks))
}

fn load_containers(remote: &dyn RemoteService) -> Result<Snapshot, OpsError> {
    let projects = remote.fetch_projects()?;
    let sections = remote.fetch_sections()?;
    Ok(Snapshot::build(projects, sections, Vec::new()))
}

pub fn list_tasks<'a>(snapshot: &'a Snapshot, options: &ListOptions) -> Result<Vec<DisplayRow<'a>>, OpsError> {
    options.validate()?;
    let scope = resolve_scope(snapshot, options.project.as_deref(), options.section.as_deref())?;
    Ok(render(snapshot, &scope, &options.view_options()))
}

pub fn create_task(
    remote: &dyn RemoteService,
    snapshot: &Snapshot,
    draft: &TaskDraft,
) -> Result<TaskCreateOutcome, OpsError> {
    let title = required(&draft.title, "task content")?;
    check_priority(draft.priority)?;
    let scope = resolve_scope(snapshot, draft.project.as_deref(), draft.section.as_deref())?;

    if !draft.force {
        let wanted = comparable_title(title);
        if let Some(existing) = scoped_tasks(snapshot, &scope)
            .into_iter()
            .find(|task| !task.completed && comparable_title(&task.title) == wanted)
        {
            debug!(id = %existing.id, "duplicate task, skipping create");
            return Ok(TaskCreateOutcome::AlreadyExists(existing.clone()));
        }
    }

    let new_task = NewTask {
        title: title.to_string(),
        project_id: scope.project().map(|project| project.id.clone()),
        section_id: scope.section().and_then(|slot| slot.id()).map(str::to_string),
        priority: draft.priority,
        due: non_blank(draft.due.as_deref()),
    };
    let task = remote.create_task(&new_task)?;
    let reminder = non_blank(draft.reminder.as_deref()).map(|due| {
        let result = remote.add_reminder(&task.id, &due);
        if let Err(err) = &result {
            warn!(task = %task.id, error = %err, "reminder not added");
        }
        result
    });
    Ok(TaskCreateOutcome::Created { task, reminder })
}

pub fn update_task(
    remote: &dyn RemoteService,
    snapshot: &Snapshot,
    target: &TaskTarget,
    update: &TaskUpdate,
) -> Result<Task, OpsError> {
    if update.is_empty() {
        return Err(OpsError::InvalidInput(
            "nothing to update: pass --new-content, --priority or --due".to_string(),
        ));
    }
    if let Some(title) = &update.title {
        required(title, "new content")?;
    }
    check_priority(update.priority)?;
    let task = find_task(snapshot, target)?;
    Ok(remote.update_task(&task.id, update)?)
}

pub fn complete_task(remote: &dyn RemoteService, snapshot: &Snapshot, target: &TaskTarget) -> Result<Task, OpsError> {
    let task = find_task(snapshot, target)?;
    remote.complete_task(&task.id)?;
    Ok(task.clone())
}

pub fn delete_task(remote: &dyn RemoteService, snapshot: &Snapshot, target: &TaskTarget) -> Result<Task, OpsError> {
    let task = find_task(snapshot, target)?;
    remote.delete_task(&task.id)?;
    Ok(task.clone())
}

fn find_task<'a>(snapshot: &'a Snapshot, target: &TaskTarget) -> Result<&'a Task, OpsError> {
    let scope = resolve_scope(snapshot, target.project.as_deref(), target.section.as_deref())?;
    Ok(resolve_task(snapshot, &scope, &target.title)?)
}

pub fn list_projects(remote: &dyn RemoteService) -> Result<Vec<Project>, OpsError> {
    let mut projects = remote.fetch_projects()?;
    projects.sort_by_key(|project| project.name.to_lowercase());
    Ok(projects)
}

pub fn create_project(remote: &dyn RemoteService, name: &str) -> Result<CreateOutcome<Project>, OpsError> {
    let name = required(name, "project name")?;
    let existing = remote.fetch_projects()?;
    if let Some(project) = existing.into_iter().find(|p| same_name(&p.name, name)) {
        return Ok(CreateOutcome::AlreadyExists(project));
    }
    Ok(CreateOutcome::Created(remote.create_project(name)?))
}

pub fn update_project(remote: &dyn RemoteService, fragment: &str, new_name: &str) -> Result<Project, OpsError> {
    let new_name = required(new_name, "new project name")?;
    let snapshot = Snapshot::build(remote.fetch_projects()?, Vec::new(), Vec::new());
    let project = resolve_project(&snapshot, fragment)?;
    Ok(remote.update_project(&project.id, new_name)?)
}

pub fn delete_project(remote: &dyn RemoteService, fragment: &str) -> Result<Project, OpsError> {
    let snapshot = Snapshot::build(remote.fetch_projects()?, Vec::new(), Vec::new());
    let project = resolve_project(&snapshot, fragment)?;
    remote.delete_project(&project.id)?;
    Ok(project.clone())
}

/// Named sections of the resolved project, sorted by name.
pub fn list_sections(remote: &dyn RemoteService, project: &str) -> Result<(Project, Vec<Section>), OpsError> {
    let snapshot = load_containers(remote)?;
    let project = resolve_project(&snapshot, project)?;
    let mut sections: Vec<Section> = snapshot.sections_of(&project.id).cloned().collect();
    sections.sort_by_key(|section| section.name.to_lowercase());
    Ok((project.clone(), sections))
}

pub fn create_section(
    remote: &dyn RemoteService,
    project: &str,
    name: &str,
) -> Result<CreateOutcome<Section>, OpsError> {
    let name = required(name, "section name")?;
    let snapshot = load_containers(remote)?;
    let project = resolve_project(&snapshot, project)?;
    if let Some(section) = snapshot.sections_of(&project.id).find(|s| same_name(&s.name, name)) {
        return Ok(CreateOutcome::AlreadyExists(section.clone()));
    }
    Ok(CreateOutcome::Created(remote.create_section(&project.id, name)?))
}

pub fn update_section(
    remote: &dyn RemoteService,
    project: &str,
    fragment: &str,
    new_name: &str,
) -> Result<Section, OpsError> {
    let new_name = required(new_name, "new section name")?;
    let snapshot = load_containers(remote)?;
    let section = named_section(&snapshot, project, fragment)?;
    Ok(remote.update_section(&section.id, new_name)?)
}

pub fn delete_section(remote: &dyn RemoteService, project: &str, fragment: &str) -> Result<Section, OpsError> {
    let snapshot = load_containers(remote)?;
    let section = named_section(&snapshot, project, fragment)?;
    remote.delete_section(&section.id)?;
    Ok(section.clone())
}

fn named_section<'a>(snapshot: &'a Snapshot, project: &str, fragment: &str) -> Result<&'a Section, OpsError> {
    let project = resolve_project(snapshot, project)?;
    match resolve_section(snapshot, project, Some(fragment))? {
        SectionSlot::Named(section) => Ok(section),
        SectionSlot::Default => Err(ResolveError::MissingFragment(EntityKind::Section).into()),
    }
}

pub fn list_labels(remote: &dyn RemoteService) -> Result<Vec<Label>, OpsError> {
    let mut labels = remote.fetch_labels()?;
    labels.sort_by_key(|label| label.name.to_lowercase());
    Ok(labels)
}

pub fn create_label(remote: &dyn RemoteService, name: &str) -> Result<CreateOutcome<Label>, OpsError> {
    let name = required(name, "label name")?;
    let labels = remote.fetch_labels()?;
    if let Some(label) = labels.into_iter().find(|l| same_name(&l.name, name)) {
        return Ok(CreateOutcome::AlreadyExists(label));
    }
    Ok(CreateOutcome::Created(remote.create_label(name)?))
}

pub fn update_label(remote: &dyn RemoteService, fragment: &str, new_name: &str) -> Result<Label, OpsError> {
    let new_name = required(new_name, "new label name")?;
    let labels = remote.fetch_labels()?;
    let label = resolve_label(&labels, fragment)?;
    Ok(remote.update_label(&label.id, new_name)?)
}

pub fn delete_label(remote: &dyn RemoteService, fragment: &str) -> Result<Label, OpsError> {
    let labels = remote.fetch_labels()?;
    let label = resolve_label(&labels, fragment)?;
    remote.delete_label(&label.id)?;
    Ok(label.clone())
}

fn check_priority(priority: Option<u8>) -> Result<(), OpsError> {
    match priority {
        Some(value) if !(1..=4).contains(&value) => Err(OpsError::InvalidInput(format!(
            "priority must be between 1 and 4, got {value}"
        ))),
        _ => Ok(()),
    }
}

fn required<'a>(value: &'a str, what: &str) -> Result<&'a str, OpsError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(OpsError::InvalidInput(format!("{what} must not be empty")));
    }
    Ok(trimmed)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn comparable_title(title: &str) -> String {
    strip(title).to_lowercase()
}

fn same_name(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}
