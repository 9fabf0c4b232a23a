//! HTTP task repository
//!
//! Talks to a JSON REST resource shaped like `/todos`:
//! `GET /`, `POST /`, `PUT /{id}`, `DELETE /{id}`.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::enrich::TaskEnricher;
use super::model::{NewTask, Task, TaskId};
use super::repository::TaskRepository;
use crate::config::ClientConfig;
use crate::{Error, Result};

const JSON_UTF8: &str = "application/json; charset=UTF-8";

/// Owner id sent when a task does not carry one
const DEFAULT_USER_ID: u64 = 1;

/// Body accepted by the remote resource
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<TaskId>,
    title: &'a str,
    completed: bool,
    user_id: u64,
}

/// Repository backed by a remote REST resource
pub struct HttpTaskRepository {
    client: Client,
    base_url: String,
    enricher: TaskEnricher,
}

impl HttpTaskRepository {
    pub fn new(base_url: impl Into<String>, enricher: TaskEnricher) -> Self {
        Self::with_client(Client::new(), base_url, enricher)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, enricher: TaskEnricher) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            enricher,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.api_url.clone(), TaskEnricher::from_seed(config.seed))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn task_url(&self, id: TaskId) -> String {
        format!("{}/{}", self.base_url, id)
    }
}

async fn check_status(resp: Response, action: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::Repository(format!(
        "Failed to {}: http {}: {}",
        action,
        status.as_u16(),
        body.trim()
    )))
}

async fn read_json<T: DeserializeOwned>(resp: Response, action: &str) -> Result<T> {
    let resp = check_status(resp, action).await?;
    resp.json::<T>()
        .await
        .map_err(|e| Error::Repository(format!("Failed to {}: {}", action, e)))
}

fn send_error(action: &str) -> impl FnOnce(reqwest::Error) -> Error + '_ {
    move |e| Error::Repository(format!("Failed to {}: {}", action, e))
}

/// Overlay the server response onto the task that was sent.
///
/// Fields present in `response` win; everything else is kept from
/// `original`. A non-object response leaves `original` untouched.
pub(crate) fn merge_response(original: &Task, response: Value) -> Result<Task> {
    let Value::Object(fields) = response else {
        return Ok(original.clone());
    };

    let mut merged = serde_json::to_value(original)?;
    if let Value::Object(target) = &mut merged {
        for (key, value) in fields {
            target.insert(key, value);
        }
    }
    Ok(serde_json::from_value(merged)?)
}

#[async_trait]
impl TaskRepository for HttpTaskRepository {
    async fn list(&self) -> Result<Vec<Task>> {
        let action = "fetch tasks";
        debug!("GET {}", self.base_url);
        let resp = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .map_err(send_error(action))?;

        let raw: Vec<Task> = read_json(resp, action).await?;
        Ok(raw.into_iter().map(|t| self.enricher.enrich(t)).collect())
    }

    async fn create(&self, input: NewTask) -> Result<Task> {
        let action = "create task";
        let payload = TaskPayload {
            id: None,
            title: &input.title,
            completed: false,
            user_id: DEFAULT_USER_ID,
        };
        debug!("POST {} title={:?}", self.base_url, input.title);
        let resp = self
            .client
            .post(&self.base_url)
            .header(CONTENT_TYPE, JSON_UTF8)
            .json(&payload)
            .send()
            .await
            .map_err(send_error(action))?;

        let raw: Task = read_json(resp, action).await?;
        let mut task = self.enricher.enrich(raw);
        input.apply_to(&mut task);
        Ok(task)
    }

    async fn update(&self, task: Task) -> Result<Task> {
        let action = "update task";
        let url = self.task_url(task.id);
        let payload = TaskPayload {
            id: Some(task.id),
            title: &task.title,
            completed: task.completed,
            user_id: task.user_id.unwrap_or(DEFAULT_USER_ID),
        };
        debug!("PUT {}", url);
        let resp = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, JSON_UTF8)
            .json(&payload)
            .send()
            .await
            .map_err(send_error(action))?;

        let response: Value = read_json(resp, action).await?;
        merge_response(&task, response)
    }

    async fn remove(&self, id: TaskId) -> Result<TaskId> {
        let action = "delete task";
        let url = self.task_url(id);
        debug!("DELETE {}", url);
        let resp = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(send_error(action))?;

        check_status(resp, action).await?;
        Ok(id)
    }
}
