use std::collections::HashSet;

use crate::due::DueFilter;
use crate::hierarchy::Snapshot;
use crate::model::Task;
use crate::resolve::{scoped_tasks, ResolvedScope};
use crate::sanitize::maybe_strip;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewOptions {
    pub show_ids: bool,
    pub show_subtasks: bool,
    pub strip_emojis: bool,
    pub due: DueFilter,
}

/// One line of a task listing before any text formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow<'a> {
    pub depth: usize,
    pub task: &'a Task,
    /// Set only when ids were requested.
    pub id: Option<&'a str>,
    /// Title as it should be shown; sanitized when emoji stripping is on.
    pub title: String,
}

/// Build the ordered rows for a listing.
///
/// Open tasks of the scope that pass the due filter are candidates. Top-level
/// candidates come out in service order; with subtasks on, each is followed
/// depth-first by its candidate descendants. A task whose parent is not a
/// candidate is hidden, except that with subtasks on and a due filter active
/// a subtask that passes the filter under a parent that fails it is listed
/// as a top-level row.
pub fn render<'a>(snapshot: &'a Snapshot, scope: &ResolvedScope<'_>, options: &ViewOptions) -> Vec<DisplayRow<'a>> {
    let due = options.due.anchored();
    let open: Vec<&Task> = scoped_tasks(snapshot, scope)
        .into_iter()
        .filter(|task| !task.completed)
        .collect();
    let candidates: Vec<&Task> = open.iter().copied().filter(|task| due.passes(task)).collect();
    let in_view: HashSet<&str> = candidates.iter().map(|task| task.id.as_str()).collect();
    // Parents that are open and in scope but fail the due filter.
    let filtered_out: HashSet<&str> = if options.show_subtasks && due.is_active() {
        open.iter()
            .map(|task| task.id.as_str())
            .filter(|id| !in_view.contains(id))
            .collect()
    } else {
        HashSet::new()
    };
    let roots: Vec<&Task> = candidates
        .iter()
        .copied()
        .filter(|task| task.parent().map_or(true, |parent| filtered_out.contains(parent)))
        .collect();

    let mut walker = Walker {
        snapshot,
        options,
        in_view,
        on_path: HashSet::new(),
        rows: Vec::new(),
    };
    for task in roots {
        if options.show_subtasks {
            walker.descend(task, 0);
        } else {
            walker.emit(task, 0);
        }
    }
    walker.rows
}

struct Walker<'a, 'o> {
    snapshot: &'a Snapshot,
    options: &'o ViewOptions,
    in_view: HashSet<&'a str>,
    on_path: HashSet<&'a str>,
    rows: Vec<DisplayRow<'a>>,
}

impl<'a> Walker<'a, '_> {
    fn emit(&mut self, task: &'a Task, depth: usize) {
        self.rows.push(DisplayRow {
            depth,
            task,
            id: self.options.show_ids.then_some(task.id.as_str()),
            title: maybe_strip(&task.title, self.options.strip_emojis),
        });
    }

    fn descend(&mut self, task: &'a Task, depth: usize) {
        if !self.on_path.insert(task.id.as_str()) {
            return;
        }
        self.emit(task, depth);
        let children: Vec<&'a Task> = self
            .snapshot
            .children_of(&task.id)
            .filter(|child| self.in_view.contains(child.id.as_str()))
            .collect();
        for child in children {
            self.descend(child, depth + 1);
        }
        self.on_path.remove(task.id.as_str());
    }
}
