use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::model::{Project, Section, Task};

/// Which bucket of a project a task sits in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Bucket {
    Default,
    Section(String),
}

/// Immutable view of everything fetched for one invocation.
///
/// Entities live in flat arenas in the order the service returned them; the
/// index maps only ever point at entities whose references all resolve. Orphans
/// stay in the arenas but are never reachable through traversal.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    projects: Vec<Project>,
    sections: Vec<Section>,
    tasks: Vec<Task>,
    project_index: HashMap<String, usize>,
    section_index: HashMap<String, usize>,
    task_index: HashMap<String, usize>,
    sections_by_project: HashMap<String, Vec<usize>>,
    tasks_by_project: HashMap<String, Vec<usize>>,
    tasks_by_bucket: HashMap<(String, Bucket), Vec<usize>>,
    children: HashMap<String, Vec<usize>>,
    attached_tasks: Vec<usize>,
    orphaned_sections: usize,
    orphaned_tasks: usize,
}

impl Snapshot {
    pub fn build(projects: Vec<Project>, sections: Vec<Section>, tasks: Vec<Task>) -> Self {
        build(projects, sections, tasks)
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.project_index.get(id).map(|&idx| &self.projects[idx])
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.section_index
            .get(id)
            .map(|&idx| &self.sections[idx])
            .filter(|section| self.project_index.contains_key(&section.project_id))
    }

    /// Named sections of a project, in service order.
    pub fn sections_of<'a>(&'a self, project_id: &str) -> impl Iterator<Item = &'a Section> + 'a {
        indexed(&self.sections, self.sections_by_project.get(project_id))
            .filter(|section| !section.is_unnamed())
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.task_index.get(id).map(|&idx| &self.tasks[idx])
    }

    /// Every task whose references resolve, in service order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> + '_ {
        self.attached_tasks.iter().map(|&idx| &self.tasks[idx])
    }

    /// Tasks of a project across all of its buckets.
    pub fn project_tasks<'a>(&'a self, project_id: &str) -> impl Iterator<Item = &'a Task> + 'a {
        indexed(&self.tasks, self.tasks_by_project.get(project_id))
    }

    /// Tasks in one bucket of a project; `None` is the default bucket.
    pub fn bucket_tasks<'a>(
        &'a self,
        project_id: &str,
        section_id: Option<&str>,
    ) -> impl Iterator<Item = &'a Task> + 'a {
        let key = (project_id.to_string(), self.bucket_for(section_id));
        indexed(&self.tasks, self.tasks_by_bucket.get(&key))
    }

    /// Direct subtasks of a task, in service order.
    pub fn children_of<'a>(&'a self, task_id: &str) -> impl Iterator<Item = &'a Task> + 'a {
        indexed(&self.tasks, self.children.get(task_id))
    }

    pub fn is_attached(&self, task_id: &str) -> bool {
        self.task_index
            .get(task_id)
            .map(|idx| self.attached_tasks.binary_search(idx).is_ok())
            .unwrap_or(false)
    }

    pub fn orphaned_sections(&self) -> usize {
        self.orphaned_sections
    }

    pub fn orphaned_tasks(&self) -> usize {
        self.orphaned_tasks
    }

    fn bucket_for(&self, section_id: Option<&str>) -> Bucket {
        match section_id.and_then(|id| self.section(id)) {
            Some(section) if !section.is_unnamed() => Bucket::Section(section.id.clone()),
            _ => Bucket::Default,
        }
    }
}

fn indexed<'a, T>(arena: &'a [T], slots: Option<&'a Vec<usize>>) -> impl Iterator<Item = &'a T> + 'a {
    slots
        .map(|slots| slots.as_slice())
        .unwrap_or(&[])
        .iter()
        .map(move |&idx| &arena[idx])
}

/// Assemble a [`Snapshot`] from the flat collections returned by the service.
///
/// A section is attached when its project exists. A task is attached when its
/// project exists, its section (if any) exists and belongs to the same project,
/// and its parent (if any) is itself attached. Subtasks of an orphan are orphans.
pub fn build(projects: Vec<Project>, sections: Vec<Section>, tasks: Vec<Task>) -> Snapshot {
    let project_index: HashMap<String, usize> = projects
        .iter()
        .enumerate()
        .map(|(idx, project)| (project.id.clone(), idx))
        .collect();
    let section_index: HashMap<String, usize> = sections
        .iter()
        .enumerate()
        .map(|(idx, section)| (section.id.clone(), idx))
        .collect();
    let task_index: HashMap<String, usize> = tasks
        .iter()
        .enumerate()
        .map(|(idx, task)| (task.id.clone(), idx))
        .collect();

    let mut sections_by_project: HashMap<String, Vec<usize>> = HashMap::new();
    let mut orphaned_sections = 0;
    for (idx, section) in sections.iter().enumerate() {
        if project_index.contains_key(&section.project_id) {
            sections_by_project
                .entry(section.project_id.clone())
                .or_default()
                .push(idx);
        } else {
            orphaned_sections += 1;
        }
    }

    let placed: Vec<bool> = tasks
        .iter()
        .map(|task| {
            if !project_index.contains_key(&task.project_id) {
                return false;
            }
            match task.section() {
                None => true,
                Some(section_id) => section_index
                    .get(section_id)
                    .map(|&idx| sections[idx].project_id == task.project_id)
                    .unwrap_or(false),
            }
        })
        .collect();
    let attached = settle_parents(&tasks, &placed, &task_index);

    let mut tasks_by_project: HashMap<String, Vec<usize>> = HashMap::new();
    let mut tasks_by_bucket: HashMap<(String, Bucket), Vec<usize>> = HashMap::new();
    let mut children: HashMap<String, Vec<usize>> = HashMap::new();
    let mut attached_tasks = Vec::new();
    for (idx, task) in tasks.iter().enumerate() {
        if !attached[idx] {
            continue;
        }
        attached_tasks.push(idx);
        tasks_by_project
            .entry(task.project_id.clone())
            .or_default()
            .push(idx);
        let bucket = match task.section() {
            Some(section_id) if !sections[section_index[section_id]].is_unnamed() => {
                Bucket::Section(section_id.to_string())
            }
            _ => Bucket::Default,
        };
        tasks_by_bucket
            .entry((task.project_id.clone(), bucket))
            .or_default()
            .push(idx);
        if let Some(parent_id) = task.parent() {
            children.entry(parent_id.to_string()).or_default().push(idx);
        }
    }
    let orphaned_tasks = tasks.len() - attached_tasks.len();

    debug!(
        projects = projects.len(),
        sections = sections.len(),
        tasks = tasks.len(),
        orphaned_sections,
        orphaned_tasks,
        "snapshot built"
    );

    Snapshot {
        projects,
        sections,
        tasks,
        project_index,
        section_index,
        task_index,
        sections_by_project,
        tasks_by_project,
        tasks_by_bucket,
        children,
        attached_tasks,
        orphaned_sections,
        orphaned_tasks,
    }
}

/// Propagate attachment down parent chains. Members of a parent cycle keep
/// their own verdict since every reference in the cycle resolves.
fn settle_parents(tasks: &[Task], placed: &[bool], task_index: &HashMap<String, usize>) -> Vec<bool> {
    let mut verdicts: Vec<Option<bool>> = vec![None; tasks.len()];
    for start in 0..tasks.len() {
        let mut path = Vec::new();
        let mut on_path = HashSet::new();
        let mut cursor = start;
        let verdict = loop {
            if let Some(known) = verdicts[cursor] {
                break known;
            }
            if !on_path.insert(cursor) {
                break true;
            }
            path.push(cursor);
            if !placed[cursor] {
                break false;
            }
            match tasks[cursor].parent() {
                None => break true,
                Some(parent_id) => match task_index.get(parent_id) {
                    Some(&parent) => cursor = parent,
                    None => break false,
                },
            }
        };
        for idx in path {
            verdicts[idx] = Some(verdict);
        }
    }
    verdicts.into_iter().map(|v| v.unwrap_or(false)).collect()
}
