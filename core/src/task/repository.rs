//! Task repository trait
//!
//! Defines the interface to the service that persists task records.

use async_trait::async_trait;

use super::model::{NewTask, Task, TaskId};
use crate::Result;

/// Repository interface for task CRUD operations
///
/// Every call may fail with [`crate::Error::Repository`]. Implementations
/// do not retry.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Fetch all tasks, enriched with demo fields
    async fn list(&self) -> Result<Vec<Task>>;

    /// Create a task and return the enriched record
    async fn create(&self, input: NewTask) -> Result<Task>;

    /// Persist the full task state
    ///
    /// The returned task is the server response merged over `task`.
    async fn update(&self, task: Task) -> Result<Task>;

    /// Delete a task by ID, returning the ID on success
    async fn remove(&self, id: TaskId) -> Result<TaskId>;
}
