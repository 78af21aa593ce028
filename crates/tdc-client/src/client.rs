use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use tdc_core::model::{Label, NewTask, Project, Section, Task, TaskUpdate};
use tdc_core::{RemoteError, RemoteService};

pub const DEFAULT_BASE_URL: &str = tdc_core::config::DEFAULT_API_BASE_URL;

const PAGE_LIMIT: &str = "200";

/// Blocking Todoist client. One instance per invocation; no retries.
#[derive(Debug, Clone)]
pub struct TodoistClient {
    http: Client,
    base_url: String,
}

/// A list endpoint answers either with a cursor page or with a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Page {
        results: Vec<T>,
        #[serde(default)]
        next_cursor: Option<String>,
    },
    Plain(Vec<T>),
}

#[derive(Debug, Serialize)]
struct NameBody<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct SectionBody<'a> {
    name: &'a str,
    project_id: &'a str,
}

#[derive(Debug, Serialize)]
struct TaskBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    section_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_string: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SyncCommand<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    uuid: String,
    temp_id: String,
    args: ReminderArgs<'a>,
}

#[derive(Debug, Serialize)]
struct ReminderArgs<'a> {
    item_id: &'a str,
    due: ReminderDue<'a>,
}

#[derive(Debug, Serialize)]
struct ReminderDue<'a> {
    string: &'a str,
}

#[derive(Debug, Deserialize)]
struct SyncResponse {
    #[serde(default)]
    sync_status: HashMap<String, Value>,
}

impl TodoistClient {
    pub fn new(token: &str, base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim())).map_err(|err| {
            RemoteError::Transport {
                endpoint: base_url.clone(),
                message: format!("API token is not a valid header value: {err}"),
            }
        })?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .user_agent(concat!("tdc/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| RemoteError::Transport {
                endpoint: base_url.clone(),
                message: err.to_string(),
            })?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, RemoteError> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;
        loop {
            let page: Listing<T> = self.send(Method::GET, path, |request| {
                let request = request.query(&[("limit", PAGE_LIMIT)]);
                match &cursor {
                    Some(cursor) => request.query(&[("cursor", cursor.as_str())]),
                    None => request,
                }
            })?;
            pages += 1;
            match page {
                Listing::Plain(results) => {
                    items.extend(results);
                    break;
                }
                Listing::Page { results, next_cursor } => {
                    items.extend(results);
                    match next_cursor.filter(|next| !next.is_empty()) {
                        Some(next) if cursor.as_deref() != Some(next.as_str()) => cursor = Some(next),
                        _ => break,
                    }
                }
            }
        }
        debug!(path, pages, items = items.len(), "listing fetched");
        Ok(items)
    }

    fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<T, RemoteError> {
        let endpoint = format!("{method} {path}");
        let body = self.execute(method, path, build)?;
        serde_json::from_str(&body).map_err(|err| RemoteError::Decode {
            endpoint,
            message: err.to_string(),
        })
    }

    fn send_empty(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<(), RemoteError> {
        self.execute(method, path, build).map(|_| ())
    }

    fn execute(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<String, RemoteError> {
        let endpoint = format!("{method} {path}");
        let url = format!("{}{}", self.base_url, path);
        debug!(%endpoint, "request");
        let transport = |err: reqwest::Error| RemoteError::Transport {
            endpoint: endpoint.clone(),
            message: err.to_string(),
        };
        let response = build(self.http.request(method, url)).send().map_err(transport)?;
        let status = response.status();
        let body = response.text().map_err(transport)?;
        debug!(%endpoint, status = status.as_u16(), "response");
        if !status.is_success() {
            return Err(RemoteError::Status {
                endpoint,
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }
        Ok(body)
    }
}

impl RemoteService for TodoistClient {
    fn fetch_projects(&self) -> Result<Vec<Project>, RemoteError> {
        self.get_all("/projects")
    }

    fn fetch_sections(&self) -> Result<Vec<Section>, RemoteError> {
        self.get_all("/sections")
    }

    fn fetch_tasks(&self) -> Result<Vec<Task>, RemoteError> {
        self.get_all("/tasks")
    }

    fn fetch_labels(&self) -> Result<Vec<Label>, RemoteError> {
        self.get_all("/labels")
    }

    fn create_project(&self, name: &str) -> Result<Project, RemoteError> {
        self.send(Method::POST, "/projects", |r| r.json(&NameBody { name }))
    }

    fn update_project(&self, id: &str, name: &str) -> Result<Project, RemoteError> {
        self.send(Method::POST, &format!("/projects/{id}"), |r| r.json(&NameBody { name }))
    }

    fn delete_project(&self, id: &str) -> Result<(), RemoteError> {
        self.send_empty(Method::DELETE, &format!("/projects/{id}"), |r| r)
    }

    fn create_section(&self, project_id: &str, name: &str) -> Result<Section, RemoteError> {
        self.send(Method::POST, "/sections", |r| r.json(&SectionBody { name, project_id }))
    }

    fn update_section(&self, id: &str, name: &str) -> Result<Section, RemoteError> {
        self.send(Method::POST, &format!("/sections/{id}"), |r| r.json(&NameBody { name }))
    }

    fn delete_section(&self, id: &str) -> Result<(), RemoteError> {
        self.send_empty(Method::DELETE, &format!("/sections/{id}"), |r| r)
    }

    fn create_task(&self, task: &NewTask) -> Result<Task, RemoteError> {
        let body = TaskBody {
            content: Some(&task.title),
            project_id: task.project_id.as_deref(),
            section_id: task.section_id.as_deref(),
            priority: task.priority,
            due_string: task.due.as_deref(),
        };
        self.send(Method::POST, "/tasks", |r| r.json(&body))
    }

    fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task, RemoteError> {
        let body = TaskBody {
            content: update.title.as_deref(),
            project_id: None,
            section_id: None,
            priority: update.priority,
            due_string: update.due.as_deref(),
        };
        self.send(Method::POST, &format!("/tasks/{id}"), |r| r.json(&body))
    }

    fn complete_task(&self, id: &str) -> Result<(), RemoteError> {
        self.send_empty(Method::POST, &format!("/tasks/{id}/close"), |r| r)
    }

    fn delete_task(&self, id: &str) -> Result<(), RemoteError> {
        self.send_empty(Method::DELETE, &format!("/tasks/{id}"), |r| r)
    }

    fn add_reminder(&self, task_id: &str, due: &str) -> Result<(), RemoteError> {
        let command_id = Uuid::new_v4().to_string();
        let commands = [SyncCommand {
            kind: "reminder_add",
            uuid: command_id.clone(),
            temp_id: Uuid::new_v4().to_string(),
            args: ReminderArgs {
                item_id: task_id,
                due: ReminderDue { string: due },
            },
        }];
        let encoded = serde_json::to_string(&commands).map_err(|err| RemoteError::Decode {
            endpoint: "POST /sync".to_string(),
            message: err.to_string(),
        })?;
        let response: SyncResponse =
            self.send(Method::POST, "/sync", |r| r.form(&[("commands", encoded.as_str())]))?;
        match response.sync_status.get(&command_id) {
            Some(Value::String(status)) if status == "ok" => Ok(()),
            Some(other) => Err(RemoteError::Rejected {
                endpoint: "POST /sync".to_string(),
                message: other.to_string(),
            }),
            None => Err(RemoteError::Rejected {
                endpoint: "POST /sync".to_string(),
                message: "no status for reminder command".to_string(),
            }),
        }
    }

    fn create_label(&self, name: &str) -> Result<Label, RemoteError> {
        self.send(Method::POST, "/labels", |r| r.json(&NameBody { name }))
    }

    fn update_label(&self, id: &str, name: &str) -> Result<Label, RemoteError> {
        self.send(Method::POST, &format!("/labels/{id}"), |r| r.json(&NameBody { name }))
    }

    fn delete_label(&self, id: &str) -> Result<(), RemoteError> {
        self.send_empty(Method::DELETE, &format!("/labels/{id}"), |r| r)
    }
}
