use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "order")]
    pub child_order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub project_id: String,
    #[serde(default, alias = "order")]
    pub section_order: i64,
}

impl Section {
    /// Sections without a name stand in for the project's default bucket.
    pub fn is_unnamed(&self) -> bool {
        self.name.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Due {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub string: String,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub datetime: Option<String>,
}

impl Due {
    /// Calendar day of the due in the user's time zone. `datetime` is UTC, so
    /// it is only consulted when `date` is blank.
    pub fn day(&self) -> Option<NaiveDate> {
        let date = self.date.trim();
        let raw = if date.is_empty() {
            self.datetime.as_deref().unwrap_or_default().trim()
        } else {
            date
        };
        let head = raw.get(..10)?;
        NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
    }

    /// Human form of the due, falling back to the raw date.
    pub fn label(&self) -> &str {
        if self.string.trim().is_empty() {
            self.date.trim()
        } else {
            self.string.trim()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(rename = "content")]
    pub title: String,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub due: Option<Due>,
    pub project_id: String,
    #[serde(default)]
    pub section_id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default, rename = "checked", alias = "is_completed")]
    pub completed: bool,
}

impl Task {
    pub fn section(&self) -> Option<&str> {
        non_blank(self.section_id.as_deref())
    }

    pub fn parent(&self) -> Option<&str> {
        non_blank(self.parent_id.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
}

/// Fields for a task about to be created remotely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub project_id: Option<String>,
    pub section_id: Option<String>,
    pub priority: Option<u8>,
    pub due: Option<String>,
}

/// Partial update for an existing task; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub priority: Option<u8>,
    pub due: Option<String>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.priority.is_none() && self.due.is_none()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
