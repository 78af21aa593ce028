use chrono::{Local, NaiveDate};

use crate::model::Task;

/// Due-date narrowing for task listings.
///
/// `today` and `overdue` widen each other; `recurring` narrows whatever they
/// let through. With every flag off all tasks pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DueFilter {
    pub today: bool,
    pub overdue: bool,
    pub recurring: bool,
    /// Calendar date treated as "today"; the local date when unset.
    pub reference: Option<NaiveDate>,
}

impl DueFilter {
    /// The `today` listing: due today or already late.
    pub fn due_now() -> Self {
        Self {
            today: true,
            overdue: true,
            ..Self::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.today || self.overdue || self.recurring
    }

    pub fn with_reference(mut self, day: NaiveDate) -> Self {
        self.reference = Some(day);
        self
    }

    /// Pin the reference date so every task in one pass is judged against the same day.
    pub fn anchored(self) -> Self {
        match self.reference {
            Some(_) => self,
            None => self.with_reference(Local::now().date_naive()),
        }
    }

    pub fn passes(&self, task: &Task) -> bool {
        if !self.is_active() {
            return true;
        }
        if self.recurring && !task.due.as_ref().is_some_and(|due| due.is_recurring) {
            return false;
        }
        if !(self.today || self.overdue) {
            return true;
        }
        let Some(day) = task.due.as_ref().and_then(|due| due.day()) else {
            return false;
        };
        let reference = self.reference.unwrap_or_else(|| Local::now().date_naive());
        (self.today && day == reference) || (self.overdue && day < reference)
    }
}
