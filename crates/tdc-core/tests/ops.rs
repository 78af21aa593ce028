use std::cell::RefCell;

use pretty_assertions::assert_eq;

use tdc_core::due::DueFilter;
use tdc_core::model::{Label, NewTask, Project, Section, Task, TaskUpdate};
use tdc_core::ops::{
    self, CreateOutcome, ListOptions, OpsError, TaskCreateOutcome, TaskDraft, TaskTarget,
};
use tdc_core::{RemoteError, RemoteService, ResolveError};

#[derive(Default)]
struct FakeRemote {
    projects: Vec<Project>,
    sections: Vec<Section>,
    tasks: Vec<Task>,
    labels: Vec<Label>,
    fail_reminders: bool,
    calls: RefCell<Vec<String>>,
    created: RefCell<Vec<NewTask>>,
}

impl FakeRemote {
    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| !call.starts_with("fetch_"))
            .collect()
    }
}

impl RemoteService for FakeRemote {
    fn fetch_projects(&self) -> Result<Vec<Project>, RemoteError> {
        self.record("fetch_projects");
        Ok(self.projects.clone())
    }

    fn fetch_sections(&self) -> Result<Vec<Section>, RemoteError> {
        self.record("fetch_sections");
        Ok(self.sections.clone())
    }

    fn fetch_tasks(&self) -> Result<Vec<Task>, RemoteError> {
        self.record("fetch_tasks");
        Ok(self.tasks.clone())
    }

    fn fetch_labels(&self) -> Result<Vec<Label>, RemoteError> {
        self.record("fetch_labels");
        Ok(self.labels.clone())
    }

    fn create_project(&self, name: &str) -> Result<Project, RemoteError> {
        self.record(format!("create_project {name}"));
        Ok(project("new", name))
    }

    fn update_project(&self, id: &str, name: &str) -> Result<Project, RemoteError> {
        self.record(format!("update_project {id} {name}"));
        Ok(project(id, name))
    }

    fn delete_project(&self, id: &str) -> Result<(), RemoteError> {
        self.record(format!("delete_project {id}"));
        Ok(())
    }

    fn create_section(&self, project_id: &str, name: &str) -> Result<Section, RemoteError> {
        self.record(format!("create_section {project_id} {name}"));
        Ok(section("new", name, project_id))
    }

    fn update_section(&self, id: &str, name: &str) -> Result<Section, RemoteError> {
        self.record(format!("update_section {id} {name}"));
        Ok(section(id, name, "p1"))
    }

    fn delete_section(&self, id: &str) -> Result<(), RemoteError> {
        self.record(format!("delete_section {id}"));
        Ok(())
    }

    fn create_task(&self, new_task: &NewTask) -> Result<Task, RemoteError> {
        self.record(format!("create_task {}", new_task.title));
        self.created.borrow_mut().push(new_task.clone());
        let mut created = task("new", &new_task.title, new_task.project_id.as_deref().unwrap_or("inbox"));
        created.section_id = new_task.section_id.clone();
        created.priority = new_task.priority;
        Ok(created)
    }

    fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task, RemoteError> {
        self.record(format!("update_task {id}"));
        let mut updated = self
            .tasks
            .iter()
            .find(|task| task.id == id)
            .cloned()
            .unwrap_or_else(|| task(id, "", "p1"));
        if let Some(title) = &update.title {
            updated.title = title.clone();
        }
        updated.priority = update.priority.or(updated.priority);
        Ok(updated)
    }

    fn complete_task(&self, id: &str) -> Result<(), RemoteError> {
        self.record(format!("complete_task {id}"));
        Ok(())
    }

    fn delete_task(&self, id: &str) -> Result<(), RemoteError> {
        self.record(format!("delete_task {id}"));
        Ok(())
    }

    fn add_reminder(&self, task_id: &str, due: &str) -> Result<(), RemoteError> {
        self.record(format!("add_reminder {task_id} {due}"));
        if self.fail_reminders {
            return Err(RemoteError::Rejected {
                endpoint: "/sync".to_string(),
                message: "reminders need a paid plan".to_string(),
            });
        }
        Ok(())
    }

    fn create_label(&self, name: &str) -> Result<Label, RemoteError> {
        self.record(format!("create_label {name}"));
        Ok(Label {
            id: "new".to_string(),
            name: name.to_string(),
        })
    }

    fn update_label(&self, id: &str, name: &str) -> Result<Label, RemoteError> {
        self.record(format!("update_label {id} {name}"));
        Ok(Label {
            id: id.to_string(),
            name: name.to_string(),
        })
    }

    fn delete_label(&self, id: &str) -> Result<(), RemoteError> {
        self.record(format!("delete_label {id}"));
        Ok(())
    }
}

fn project(id: &str, name: &str) -> Project {
    Project {
        id: id.to_string(),
        name: name.to_string(),
        child_order: 0,
    }
}

fn section(id: &str, name: &str, project_id: &str) -> Section {
    Section {
        id: id.to_string(),
        name: name.to_string(),
        project_id: project_id.to_string(),
        section_order: 0,
    }
}

fn task(id: &str, title: &str, project_id: &str) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        priority: None,
        due: None,
        project_id: project_id.to_string(),
        section_id: None,
        parent_id: None,
        completed: false,
    }
}

fn in_section(mut task: Task, section_id: &str) -> Task {
    task.section_id = Some(section_id.to_string());
    task
}

fn child_of(mut task: Task, parent_id: &str) -> Task {
    task.parent_id = Some(parent_id.to_string());
    task
}

fn routines() -> FakeRemote {
    let mut done = task("t9", "Brush dog", "p1");
    done.completed = true;
    FakeRemote {
        projects: vec![project("p1", "Daily Routines"), project("p2", "Work"), project("p3", "Work Projects")],
        sections: vec![section("s1", "Morning", "p1"), section("s2", "Evening", "p1")],
        tasks: vec![
            in_section(task("t1", "Brush teeth", "p1"), "s1"),
            child_of(in_section(task("t2", "Floss", "p1"), "s1"), "t1"),
            in_section(task("t3", "Read 📚", "p1"), "s2"),
            task("t4", "Stretch", "p1"),
            task("t5", "Email", "p2"),
            task("t6", "Lost", "gone"),
            done,
        ],
        labels: vec![
            Label {
                id: "l1".to_string(),
                name: "urgent".to_string(),
            },
            Label {
                id: "l2".to_string(),
                name: "Errand".to_string(),
            },
        ],
        ..FakeRemote::default()
    }
}

fn titles(rows: &[tdc_core::views::DisplayRow<'_>]) -> Vec<(usize, String)> {
    rows.iter().map(|row| (row.depth, row.title.clone())).collect()
}

#[test]
fn load_snapshot_fetches_each_collection_once() {
    let remote = routines();
    let snapshot = ops::load_snapshot(&remote).expect("snapshot");
    assert_eq!(remote.calls(), vec!["fetch_projects", "fetch_sections", "fetch_tasks"]);
    assert_eq!(snapshot.orphaned_tasks(), 1);
}

#[test]
fn list_tasks_scopes_and_nests() {
    let remote = routines();
    let snapshot = ops::load_snapshot(&remote).expect("snapshot");

    let options = ListOptions {
        project: Some("daily".to_string()),
        section: Some("morn".to_string()),
        ..ListOptions::default()
    };
    let rows = ops::list_tasks(&snapshot, &options).expect("rows");
    assert_eq!(titles(&rows), vec![(0, "Brush teeth".to_string())]);

    let options = ListOptions {
        show_subtasks: true,
        ..options
    };
    let rows = ops::list_tasks(&snapshot, &options).expect("rows");
    assert_eq!(
        titles(&rows),
        vec![(0, "Brush teeth".to_string()), (1, "Floss".to_string())]
    );
}

#[test]
fn orphaned_task_never_shows_up() {
    let remote = routines();
    let snapshot = ops::load_snapshot(&remote).expect("snapshot");
    let rows = ops::list_tasks(
        &snapshot,
        &ListOptions {
            show_subtasks: true,
            strip_emojis: true,
            ..ListOptions::default()
        },
    )
    .expect("rows");
    let shown: Vec<String> = rows.iter().map(|row| row.title.clone()).collect();
    assert_eq!(shown, vec!["Brush teeth", "Floss", "Read", "Stretch", "Email"]);
}

#[test]
fn list_due_filter_without_dates_is_empty() {
    let remote = routines();
    let snapshot = ops::load_snapshot(&remote).expect("snapshot");
    let rows = ops::list_tasks(
        &snapshot,
        &ListOptions {
            due: DueFilter::due_now(),
            ..ListOptions::default()
        },
    )
    .expect("rows");
    assert!(rows.is_empty());
}

#[test]
fn ambiguous_project_is_reported_with_every_match() {
    let remote = routines();
    let snapshot = ops::load_snapshot(&remote).expect("snapshot");
    let err = ops::list_tasks(
        &snapshot,
        &ListOptions {
            project: Some("Work".to_string()),
            ..ListOptions::default()
        },
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "'Work' matches 2 projects: Work, Work Projects");
}

#[test]
fn create_task_places_into_resolved_section_and_adds_reminder() {
    let remote = routines();
    let snapshot = ops::load_snapshot(&remote).expect("snapshot");
    let draft = TaskDraft {
        title: "Shave".to_string(),
        project: Some("routines".to_string()),
        section: Some("morning".to_string()),
        priority: Some(4),
        due: Some("tomorrow".to_string()),
        reminder: Some("tomorrow 7am".to_string()),
        force: false,
    };
    let outcome = ops::create_task(&remote, &snapshot, &draft).expect("create");
    match outcome {
        TaskCreateOutcome::Created { task, reminder } => {
            assert_eq!(task.title, "Shave");
            assert!(matches!(reminder, Some(Ok(()))));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(
        remote.created.borrow().clone(),
        vec![NewTask {
            title: "Shave".to_string(),
            project_id: Some("p1".to_string()),
            section_id: Some("s1".to_string()),
            priority: Some(4),
            due: Some("tomorrow".to_string()),
        }]
    );
    assert_eq!(
        remote.mutations(),
        vec!["create_task Shave", "add_reminder new tomorrow 7am"]
    );
}

#[test]
fn create_task_detects_emoji_and_case_duplicates_unless_forced() {
    let remote = routines();
    let snapshot = ops::load_snapshot(&remote).expect("snapshot");
    let draft = TaskDraft {
        title: "read".to_string(),
        project: Some("daily".to_string()),
        ..TaskDraft::default()
    };
    let outcome = ops::create_task(&remote, &snapshot, &draft).expect("create");
    match outcome {
        TaskCreateOutcome::AlreadyExists(existing) => assert_eq!(existing.id, "t3"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(remote.mutations().is_empty());

    let forced = TaskDraft { force: true, ..draft };
    let outcome = ops::create_task(&remote, &snapshot, &forced).expect("create");
    assert!(matches!(outcome, TaskCreateOutcome::Created { reminder: None, .. }));
    assert_eq!(remote.mutations(), vec!["create_task read"]);
}

#[test]
fn completed_tasks_do_not_count_as_duplicates() {
    let remote = routines();
    let snapshot = ops::load_snapshot(&remote).expect("snapshot");
    let draft = TaskDraft {
        title: "Brush dog".to_string(),
        ..TaskDraft::default()
    };
    let outcome = ops::create_task(&remote, &snapshot, &draft).expect("create");
    assert!(matches!(outcome, TaskCreateOutcome::Created { .. }));
    assert_eq!(remote.created.borrow()[0].project_id, None);
}

#[test]
fn failed_reminder_is_a_warning_not_an_error() {
    let remote = FakeRemote {
        fail_reminders: true,
        ..routines()
    };
    let snapshot = ops::load_snapshot(&remote).expect("snapshot");
    let draft = TaskDraft {
        title: "Call mom".to_string(),
        reminder: Some("in 1 hour".to_string()),
        ..TaskDraft::default()
    };
    let outcome = ops::create_task(&remote, &snapshot, &draft).expect("create");
    match outcome {
        TaskCreateOutcome::Created { reminder, .. } => {
            assert!(matches!(reminder, Some(Err(RemoteError::Rejected { .. }))))
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn out_of_range_priority_is_rejected_before_any_call() {
    let remote = routines();
    let snapshot = ops::load_snapshot(&remote).expect("snapshot");
    let draft = TaskDraft {
        title: "Anything".to_string(),
        priority: Some(7),
        ..TaskDraft::default()
    };
    let err = ops::create_task(&remote, &snapshot, &draft).unwrap_err();
    assert!(matches!(err, OpsError::InvalidInput(_)));
    assert!(remote.mutations().is_empty());
}

#[test]
fn task_mutations_resolve_by_fragment_within_scope() {
    let remote = routines();
    let snapshot = ops::load_snapshot(&remote).expect("snapshot");

    let done = ops::complete_task(
        &remote,
        &snapshot,
        &TaskTarget {
            title: "teeth".to_string(),
            ..TaskTarget::default()
        },
    )
    .expect("complete");
    assert_eq!(done.id, "t1");

    let removed = ops::delete_task(
        &remote,
        &snapshot,
        &TaskTarget {
            project: Some("work".to_string()),
            section: None,
            title: "mail".to_string(),
        },
    );
    assert!(matches!(
        removed,
        Err(OpsError::Resolve(ResolveError::Ambiguous { .. }))
    ));

    let updated = ops::update_task(
        &remote,
        &snapshot,
        &TaskTarget {
            title: "stretch".to_string(),
            ..TaskTarget::default()
        },
        &TaskUpdate {
            title: Some("Stretch legs".to_string()),
            priority: Some(2),
            due: None,
        },
    )
    .expect("update");
    assert_eq!(updated.title, "Stretch legs");
    assert_eq!(remote.mutations(), vec!["complete_task t1", "update_task t4"]);
}

#[test]
fn completed_task_cannot_be_targeted() {
    let remote = routines();
    let snapshot = ops::load_snapshot(&remote).expect("snapshot");
    let err = ops::complete_task(
        &remote,
        &snapshot,
        &TaskTarget {
            title: "dog".to_string(),
            ..TaskTarget::default()
        },
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "No task found matching 'dog'");
}

#[test]
fn empty_update_is_invalid() {
    let remote = routines();
    let snapshot = ops::load_snapshot(&remote).expect("snapshot");
    let err = ops::update_task(
        &remote,
        &snapshot,
        &TaskTarget {
            title: "stretch".to_string(),
            ..TaskTarget::default()
        },
        &TaskUpdate::default(),
    )
    .unwrap_err();
    assert!(matches!(err, OpsError::InvalidInput(_)));
}

#[test]
fn projects_list_sorted_and_create_deduplicates() {
    let remote = routines();
    let names: Vec<String> = ops::list_projects(&remote)
        .expect("list")
        .into_iter()
        .map(|project| project.name)
        .collect();
    assert_eq!(names, vec!["Daily Routines", "Work", "Work Projects"]);

    let outcome = ops::create_project(&remote, "  work ").expect("create");
    assert_eq!(outcome, CreateOutcome::AlreadyExists(project("p2", "Work")));

    let outcome = ops::create_project(&remote, "Garden").expect("create");
    assert_eq!(outcome, CreateOutcome::Created(project("new", "Garden")));
    assert_eq!(remote.mutations(), vec!["create_project Garden"]);
}

#[test]
fn project_rename_and_delete_resolve_fragments() {
    let remote = routines();
    let renamed = ops::update_project(&remote, "daily", "Routines").expect("rename");
    assert_eq!(renamed, project("p1", "Routines"));

    let err = ops::delete_project(&remote, "work").unwrap_err();
    assert!(matches!(err, OpsError::Resolve(ResolveError::Ambiguous { .. })));

    let deleted = ops::delete_project(&remote, "projects").expect("delete");
    assert_eq!(deleted.id, "p3");
    assert_eq!(remote.mutations(), vec!["update_project p1 Routines", "delete_project p3"]);
}

#[test]
fn sections_live_inside_their_project() {
    let remote = routines();
    let (owner, sections) = ops::list_sections(&remote, "daily").expect("list");
    assert_eq!(owner.id, "p1");
    let names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Evening", "Morning"]);

    let outcome = ops::create_section(&remote, "daily", "MORNING").expect("create");
    assert!(matches!(outcome, CreateOutcome::AlreadyExists(ref s) if s.id == "s1"));

    let outcome = ops::create_section(&remote, "email", "Inbox");
    assert!(matches!(outcome, Err(OpsError::Resolve(ResolveError::NotFound { .. }))));

    ops::update_section(&remote, "daily", "even", "Night").expect("rename");
    ops::delete_section(&remote, "daily", "morn").expect("delete");
    assert_eq!(remote.mutations(), vec!["update_section s2 Night", "delete_section s1"]);
}

#[test]
fn labels_follow_the_same_matching_rules() {
    let remote = routines();
    let names: Vec<String> = ops::list_labels(&remote)
        .expect("list")
        .into_iter()
        .map(|label| label.name)
        .collect();
    assert_eq!(names, vec!["Errand", "urgent"]);

    assert!(matches!(
        ops::create_label(&remote, "URGENT").expect("create"),
        CreateOutcome::AlreadyExists(_)
    ));
    ops::update_label(&remote, "err", "errands").expect("rename");
    let err = ops::delete_label(&remote, "zzz").unwrap_err();
    assert_eq!(err.to_string(), "No label found matching 'zzz'");
    assert_eq!(remote.mutations(), vec!["update_label l2 errands"]);
}
