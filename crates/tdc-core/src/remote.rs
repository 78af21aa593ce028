use thiserror::Error;

use crate::model::{Label, NewTask, Project, Section, Task, TaskUpdate};

/// Failure talking to the task service. Carried through the core unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
    #[error("{endpoint} rejected the command: {message}")]
    Rejected { endpoint: String, message: String },
}

/// Everything the core needs from the remote task service.
pub trait RemoteService {
    fn fetch_projects(&self) -> Result<Vec<Project>, RemoteError>;
    fn fetch_sections(&self) -> Result<Vec<Section>, RemoteError>;
    fn fetch_tasks(&self) -> Result<Vec<Task>, RemoteError>;
    fn fetch_labels(&self) -> Result<Vec<Label>, RemoteError>;

    fn create_project(&self, name: &str) -> Result<Project, RemoteError>;
    fn update_project(&self, id: &str, name: &str) -> Result<Project, RemoteError>;
    fn delete_project(&self, id: &str) -> Result<(), RemoteError>;

    fn create_section(&self, project_id: &str, name: &str) -> Result<Section, RemoteError>;
    fn update_section(&self, id: &str, name: &str) -> Result<Section, RemoteError>;
    fn delete_section(&self, id: &str) -> Result<(), RemoteError>;

    fn create_task(&self, task: &NewTask) -> Result<Task, RemoteError>;
    fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task, RemoteError>;
    fn complete_task(&self, id: &str) -> Result<(), RemoteError>;
    fn delete_task(&self, id: &str) -> Result<(), RemoteError>;
    /// Attach a reminder to an existing task; `due` is a natural-language due string.
    fn add_reminder(&self, task_id: &str, due: &str) -> Result<(), RemoteError>;

    fn create_label(&self, name: &str) -> Result<Label, RemoteError>;
    fn update_label(&self, id: &str, name: &str) -> Result<Label, RemoteError>;
    fn delete_label(&self, id: &str) -> Result<(), RemoteError>;
}
