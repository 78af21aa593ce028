use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::model::{Label, Project, Section, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Project,
    Section,
    Task,
    Label,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Project => write!(f, "project"),
            EntityKind::Section => write!(f, "section"),
            EntityKind::Task => write!(f, "task"),
            EntityKind::Label => write!(f, "label"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("A {0} name is required")]
    MissingFragment(EntityKind),
    #[error("No {kind} found matching '{fragment}'")]
    NotFound { kind: EntityKind, fragment: String },
    #[error("'{fragment}' matches {} {kind}s: {}", .matches.len(), .matches.join(", "))]
    Ambiguous {
        kind: EntityKind,
        fragment: String,
        matches: Vec<String>,
    },
    #[error("--section requires --project")]
    SectionWithoutProject,
}

/// Anything that can be picked out of a list by a name fragment.
pub trait Named {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

impl Named for Project {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Section {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Task {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.title
    }
}

impl Named for Label {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
}

/// Case-insensitive substring containment.
pub fn matches(name: &str, fragment: &str) -> bool {
    name.to_lowercase().contains(&fragment.to_lowercase())
}

/// Pick the single candidate whose name contains `fragment`.
///
/// An exact name match gets no priority over partial ones: `"Work"` against
/// `["Work", "Work Projects"]` is ambiguous, so naming collisions reach the user
/// instead of being guessed away.
pub fn match_one<'a, T, I>(candidates: I, fragment: &str, kind: EntityKind) -> Result<&'a T, ResolveError>
where
    T: Named + 'a,
    I: IntoIterator<Item = &'a T>,
{
    if fragment.trim().is_empty() {
        return Err(ResolveError::MissingFragment(kind));
    }
    let needle = fragment.to_lowercase();
    let found: Vec<&T> = candidates
        .into_iter()
        .filter(|candidate| candidate.name().to_lowercase().contains(&needle))
        .collect();

    match found.as_slice() {
        [] => Err(ResolveError::NotFound {
            kind,
            fragment: fragment.to_string(),
        }),
        [single] => {
            debug!(%kind, fragment, id = single.id(), "resolved");
            Ok(*single)
        }
        many => Err(ResolveError::Ambiguous {
            kind,
            fragment: fragment.to_string(),
            matches: many.iter().map(|c| c.name().to_string()).collect(),
        }),
    }
}
