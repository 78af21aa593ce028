use crate::hierarchy::Snapshot;
use crate::matcher::{match_one, EntityKind, ResolveError};
use crate::model::{Label, Project, Section, Task};

/// A section of a resolved project: either a named section or the implicit default bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionSlot<'a> {
    Default,
    Named(&'a Section),
}

impl<'a> SectionSlot<'a> {
    pub fn id(&self) -> Option<&'a str> {
        match self {
            SectionSlot::Default => None,
            SectionSlot::Named(section) => Some(section.id.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedScope<'a> {
    Unscoped,
    Project(&'a Project),
    Section {
        project: &'a Project,
        section: SectionSlot<'a>,
    },
}

impl<'a> ResolvedScope<'a> {
    pub fn project(&self) -> Option<&'a Project> {
        match self {
            ResolvedScope::Unscoped => None,
            ResolvedScope::Project(project) => Some(project),
            ResolvedScope::Section { project, .. } => Some(project),
        }
    }

    pub fn section(&self) -> Option<SectionSlot<'a>> {
        match self {
            ResolvedScope::Section { section, .. } => Some(*section),
            _ => None,
        }
    }
}

pub fn resolve_project<'a>(snapshot: &'a Snapshot, fragment: &str) -> Result<&'a Project, ResolveError> {
    match_one(snapshot.projects(), fragment, EntityKind::Project)
}

/// Without a fragment the project's default bucket is returned and no matching happens.
pub fn resolve_section<'a>(
    snapshot: &'a Snapshot,
    project: &Project,
    fragment: Option<&str>,
) -> Result<SectionSlot<'a>, ResolveError> {
    match fragment.map(str::trim).filter(|f| !f.is_empty()) {
        None => Ok(SectionSlot::Default),
        Some(fragment) => {
            match_one(snapshot.sections_of(&project.id), fragment, EntityKind::Section)
                .map(SectionSlot::Named)
        }
    }
}

/// Narrow a snapshot by optional project and section fragments.
pub fn resolve_scope<'a>(
    snapshot: &'a Snapshot,
    project: Option<&str>,
    section: Option<&str>,
) -> Result<ResolvedScope<'a>, ResolveError> {
    check_scope_args(project, section)?;
    let Some(project_fragment) = project else {
        return Ok(ResolvedScope::Unscoped);
    };
    let project = resolve_project(snapshot, project_fragment)?;
    match section {
        None => Ok(ResolvedScope::Project(project)),
        Some(fragment) => Ok(ResolvedScope::Section {
            project,
            section: resolve_section(snapshot, project, Some(fragment))?,
        }),
    }
}

/// Reject a section fragment that comes without a project fragment.
pub fn check_scope_args(project: Option<&str>, section: Option<&str>) -> Result<(), ResolveError> {
    if section.is_some() && project.is_none() {
        return Err(ResolveError::SectionWithoutProject);
    }
    Ok(())
}

/// All attached tasks inside a scope, completed or not, in service order.
pub fn scoped_tasks<'a>(snapshot: &'a Snapshot, scope: &ResolvedScope<'_>) -> Vec<&'a Task> {
    match scope {
        ResolvedScope::Unscoped => snapshot.tasks().collect(),
        ResolvedScope::Project(project) => snapshot.project_tasks(&project.id).collect(),
        ResolvedScope::Section { project, section } => {
            snapshot.bucket_tasks(&project.id, section.id()).collect()
        }
    }
}

/// Find the single open task in scope whose title contains `fragment`.
pub fn resolve_task<'a>(
    snapshot: &'a Snapshot,
    scope: &ResolvedScope<'_>,
    fragment: &str,
) -> Result<&'a Task, ResolveError> {
    let open: Vec<&Task> = scoped_tasks(snapshot, scope)
        .into_iter()
        .filter(|task| !task.completed)
        .collect();
    match_one(open, fragment, EntityKind::Task)
}

pub fn resolve_label<'a>(labels: &'a [Label], fragment: &str) -> Result<&'a Label, ResolveError> {
    match_one(labels, fragment, EntityKind::Label)
}
