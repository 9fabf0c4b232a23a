//! In-memory task repository
//!
//! Implements the repository contract inside the process. Used for tests
//! and the offline demo mode; nothing survives the process.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::enrich::TaskEnricher;
use super::model::{NewTask, Task, TaskId};
use super::repository::TaskRepository;
use crate::{Error, Result};

const DEMO_USER_ID: u64 = 1;

const DEMO_TITLES: &[&str] = &[
    "Buy milk",
    "Renew passport",
    "Write quarterly report",
    "Book dentist appointment",
    "Fix leaking tap",
    "Plan team offsite",
    "Read chapter 4",
    "Update resume",
    "Call the bank",
    "Water the plants",
    "Back up laptop",
    "Pay electricity bill",
];

struct Inner {
    tasks: Vec<Task>,
    next_id: u64,
    failure: Option<String>,
}

/// Process-local task repository
pub struct InMemoryTaskRepository {
    inner: RwLock<Inner>,
    enricher: TaskEnricher,
}

impl InMemoryTaskRepository {
    pub fn new(enricher: TaskEnricher) -> Self {
        Self::with_tasks(Vec::new(), enricher)
    }

    /// Start from the given records; new ids continue after the largest one
    pub fn with_tasks(tasks: Vec<Task>, enricher: TaskEnricher) -> Self {
        let next_id = tasks.iter().map(|t| t.id.0).max().unwrap_or(0) + 1;
        Self {
            inner: RwLock::new(Inner {
                tasks,
                next_id,
                failure: None,
            }),
            enricher,
        }
    }

    /// Seed `count` enriched demo tasks, every third one completed
    pub fn with_demo_tasks(count: usize, enricher: TaskEnricher) -> Self {
        let tasks = (0..count)
            .map(|i| {
                let base = DEMO_TITLES[i % DEMO_TITLES.len()];
                let title = match i / DEMO_TITLES.len() {
                    0 => base.to_string(),
                    round => format!("{} #{}", base, round + 1),
                };
                let mut raw = Task::new(TaskId(i as u64 + 1), title);
                raw.completed = i % 3 == 2;
                raw.user_id = Some(DEMO_USER_ID);
                enricher.enrich(raw)
            })
            .collect();
        Self::with_tasks(tasks, enricher)
    }

    /// Make every subsequent call fail with `message`, or recover with `None`
    pub async fn set_failure(&self, message: Option<String>) {
        self.inner.write().await.failure = message;
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.tasks.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check(inner: &Inner) -> Result<()> {
        match &inner.failure {
            Some(message) => Err(Error::Repository(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn list(&self) -> Result<Vec<Task>> {
        let inner = self.inner.read().await;
        Self::check(&inner)?;
        Ok(inner.tasks.clone())
    }

    async fn create(&self, input: NewTask) -> Result<Task> {
        let mut inner = self.inner.write().await;
        Self::check(&inner)?;

        let mut raw = Task::new(TaskId(inner.next_id), input.title.clone());
        raw.user_id = Some(DEMO_USER_ID);
        inner.next_id += 1;

        let mut task = self.enricher.enrich(raw);
        input.apply_to(&mut task);
        inner.tasks.insert(0, task.clone());
        Ok(task)
    }

    async fn update(&self, task: Task) -> Result<Task> {
        let mut inner = self.inner.write().await;
        Self::check(&inner)?;

        match inner.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => {
                *existing = task.clone();
                Ok(task)
            }
            None => Err(Error::Repository(format!("Task not found: {}", task.id))),
        }
    }

    async fn remove(&self, id: TaskId) -> Result<TaskId> {
        let mut inner = self.inner.write().await;
        Self::check(&inner)?;
        inner.tasks.retain(|t| t.id != id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;

    fn repo_with_demo(count: usize) -> InMemoryTaskRepository {
        InMemoryTaskRepository::with_demo_tasks(count, TaskEnricher::seeded(11))
    }

    #[tokio::test]
    async fn test_demo_tasks_are_enriched() {
        let repo = repo_with_demo(25);
        let tasks = repo.list().await.unwrap();

        assert_eq!(tasks.len(), 25);
        assert!(tasks.iter().all(|t| t.is_consistent()));
        assert_eq!(tasks[2].status, TaskStatus::Completed);
        assert_eq!(tasks[0].title, "Buy milk");
        assert_eq!(tasks[12].title, "Buy milk #2");
    }

    #[tokio::test]
    async fn test_create_assigns_next_id_and_prepends() {
        let repo = repo_with_demo(3);

        let created = repo.create(NewTask::new("New one")).await.unwrap();
        assert_eq!(created.id, TaskId(4));

        let tasks = repo.list().await.unwrap();
        assert_eq!(tasks.len(), 4);
        assert_eq!(tasks[0].id, created.id);
    }

    #[tokio::test]
    async fn test_update_nonexistent_task() {
        let repo = repo_with_demo(1);
        let result = repo.update(Task::new(TaskId(99), "ghost")).await;

        match result.unwrap_err() {
            Error::Repository(msg) => assert!(msg.contains("not found")),
            e => panic!("Expected Repository error, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let repo = repo_with_demo(2);
        assert_eq!(repo.remove(TaskId(1)).await.unwrap(), TaskId(1));
        assert_eq!(repo.remove(TaskId(1)).await.unwrap(), TaskId(1));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let repo = repo_with_demo(2);
        repo.set_failure(Some("service unavailable".to_string())).await;

        match repo.list().await.unwrap_err() {
            Error::Repository(msg) => assert_eq!(msg, "service unavailable"),
            e => panic!("Expected Repository error, got: {:?}", e),
        }

        repo.set_failure(None).await;
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }
}
