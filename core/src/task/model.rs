//! Task model definitions

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Identifier assigned by the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(TaskId)
            .map_err(|_| Error::InvalidInput(format!("Invalid task id: {}", s)))
    }
}

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown status: {}", s)))
    }
}

/// A task as held by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub completed: bool,
    /// Owner id echoed by the remote resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
}

impl Task {
    /// Create a pending task with the given id and title
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            due_date: None,
            status: TaskStatus::default(),
            progress: 0,
            completed: false,
            user_id: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the due date
    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Set the status and bring `completed`/`progress` in line with it
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self.normalize();
        self
    }

    /// Set the progress; only meaningful while in progress
    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = progress;
        self.normalize();
        self
    }

    /// Enforce `completed <=> status == completed <=> progress == 100`.
    ///
    /// `status` is authoritative. In-progress tasks keep their progress but
    /// clamped to 1..=99 so they cannot read as pending or completed.
    pub fn normalize(&mut self) {
        match self.status {
            TaskStatus::Completed => {
                self.completed = true;
                self.progress = 100;
            }
            TaskStatus::Pending => {
                self.completed = false;
                self.progress = 0;
            }
            TaskStatus::InProgress => {
                self.completed = false;
                self.progress = self.progress.clamp(1, 99);
            }
        }
    }

    pub fn is_consistent(&self) -> bool {
        match self.status {
            TaskStatus::Completed => self.completed && self.progress == 100,
            TaskStatus::Pending => !self.completed && self.progress == 0,
            TaskStatus::InProgress => !self.completed && (1..=99).contains(&self.progress),
        }
    }

    /// Copy with completion flipped: completed/100 or pending/0.
    pub fn toggled(&self) -> Self {
        let mut task = self.clone();
        task.completed = !self.completed;
        if task.completed {
            task.status = TaskStatus::Completed;
            task.progress = 100;
        } else {
            task.status = TaskStatus::Pending;
            task.progress = 0;
        }
        task
    }
}

/// Input for creating a task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<TaskStatus>,
    pub progress: Option<u8>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress);
        self
    }

    /// A title that is empty after trimming blocks creation
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Overlay the caller-supplied fields onto a created record
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(description) = self.description.as_ref().filter(|d| !d.trim().is_empty()) {
            task.description = Some(description.clone());
        }
        if let Some(due_date) = self.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(status) = self.status {
            task.status = status;
            if let Some(progress) = self.progress {
                task.progress = progress;
            }
        }
        task.normalize();
    }
}
