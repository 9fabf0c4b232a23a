//! Task edit form
//!
//! Validation here gates an intent before it reaches the store; a draft
//! that fails validation is never dispatched.

use chrono::NaiveDate;
use std::fmt;

use crate::task::{NewTask, Task, TaskId, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    DueDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

/// Every problem found in a draft
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldErrors(pub Vec<FieldError>);

impl FieldErrors {
    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.0.iter().find(|e| e.field == field).map(|e| e.message)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message).collect();
        f.write_str(&messages.join(", "))
    }
}

/// Form contents for creating or editing a task
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    pub id: Option<TaskId>,
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatus,
    pub progress: u8,
    pub completed: bool,
    user_id: Option<u64>,
}

impl TaskDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefill the form from an existing task
    pub fn edit(task: &Task) -> Self {
        Self {
            id: Some(task.id),
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            due_date: task.due_date,
            status: task.status,
            progress: task.progress,
            completed: task.completed,
            user_id: task.user_id,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    /// Change status the way the form does: completed pins progress to 100,
    /// pending to 0, in-progress keeps the current value.
    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.completed = status == TaskStatus::Completed;
        match status {
            TaskStatus::Completed => self.progress = 100,
            TaskStatus::Pending => self.progress = 0,
            TaskStatus::InProgress => {}
        }
    }

    /// Only honoured while in progress
    pub fn set_progress(&mut self, progress: u8) {
        if self.status == TaskStatus::InProgress {
            self.progress = progress.min(100);
        }
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(FieldError {
                field: Field::Title,
                message: "Title is required",
            });
        }
        if self.due_date.is_none() {
            errors.push(FieldError {
                field: Field::DueDate,
                message: "Due date is required",
            });
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(FieldErrors(errors))
        }
    }

    fn description(&self) -> Option<String> {
        let description = self.description.trim();
        (!description.is_empty()).then(|| description.to_string())
    }

    pub fn to_new_task(&self) -> NewTask {
        let mut input = NewTask::new(self.title.clone()).with_status(self.status);
        input.description = self.description();
        input.due_date = self.due_date;
        input.progress = Some(self.progress);
        input
    }

    /// Validate and turn the draft into a store intent
    pub fn submit(&self) -> Result<Submission, FieldErrors> {
        self.validate()?;
        Ok(match self.to_task() {
            Some(task) => Submission::Update(task),
            None => Submission::Create(self.to_new_task()),
        })
    }

    /// The edited task, or `None` for a draft that was never saved
    pub fn to_task(&self) -> Option<Task> {
        let id = self.id?;
        Some(Task {
            id,
            title: self.title.clone(),
            description: self.description(),
            due_date: self.due_date,
            status: self.status,
            progress: self.progress,
            completed: self.completed,
            user_id: self.user_id,
        })
    }
}

/// What submitting a valid form asks the store to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Create(NewTask),
    Update(Task),
}
