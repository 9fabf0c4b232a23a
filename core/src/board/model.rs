//! Board state and the displayed projection
//!
//! Every reducer step lives here as a plain method on [`BoardState`] so it
//! can be applied atomically under the store's lock and tested without a
//! runtime.

use std::sync::Arc;

use crate::task::{Task, TaskId, TaskStatus};

/// Status filter as requested by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(TaskStatus),
    /// A status nothing can have; matches no task
    Unknown(String),
}

impl StatusFilter {
    /// Trimmed and case-insensitive; `all` selects everything.
    pub fn parse(raw: &str) -> Self {
        let wanted = raw.trim().to_ascii_lowercase();
        if wanted == "all" {
            return Self::All;
        }
        match wanted.parse::<TaskStatus>() {
            Ok(status) => Self::Only(status),
            Err(_) => Self::Unknown(wanted),
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => task.status == *status,
            Self::Unknown(_) => false,
        }
    }
}

/// The projection currently applied to `tasks`
///
/// Search and filter replace each other; the most recent request wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    All,
    /// Lowercased, trimmed, non-empty search term
    Search(String),
    Filter(StatusFilter),
}

impl View {
    pub fn search(term: &str) -> Self {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            Self::All
        } else {
            Self::Search(term)
        }
    }

    pub fn filter(raw: &str) -> Self {
        match StatusFilter::parse(raw) {
            StatusFilter::All => Self::All,
            filter => Self::Filter(filter),
        }
    }
}

/// Apply `view` to `tasks`, keeping order
pub fn project(tasks: &[Task], view: &View) -> Vec<Task> {
    match view {
        View::All => tasks.to_vec(),
        View::Search(term) => tasks
            .iter()
            .filter(|t| t.title.to_lowercase().contains(term.as_str()))
            .cloned()
            .collect(),
        View::Filter(filter) => tasks.iter().filter(|t| filter.matches(t)).cloned().collect(),
    }
}

/// Complete store state
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    tasks: Arc<Vec<Task>>,
    displayed_tasks: Arc<Vec<Task>>,
    view: View,
    in_flight: usize,
    error: Option<String>,
    revision: u64,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &Arc<Vec<Task>> {
        &self.tasks
    }

    pub fn displayed_tasks(&self) -> &Arc<Vec<Task>> {
        &self.displayed_tasks
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Bumped every time `displayed_tasks` is replaced
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Operation dispatched: loading, previous error cleared
    pub fn begin(&mut self) {
        self.in_flight += 1;
        self.error = None;
    }

    /// Operation fulfilled
    pub fn settle(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Operation rejected
    pub fn reject(&mut self, message: impl Into<String>) {
        self.settle();
        self.error = Some(message.into());
    }

    /// Replace the projection and bump the revision.
    pub fn set_view(&mut self, view: View) {
        self.displayed_tasks = match view {
            View::All => Arc::clone(&self.tasks),
            ref view => Arc::new(project(&self.tasks, view)),
        };
        self.view = view;
        self.revision += 1;
    }

    /// Replace all tasks, dropping any search or filter.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = Arc::new(tasks);
        self.set_view(View::All);
    }

    pub fn prepend(&mut self, task: Task) {
        Arc::make_mut(&mut self.tasks).insert(0, task);
        self.set_view(View::All);
    }

    /// Replace the entry with the same id. An absent id is a no-op.
    pub fn replace(&mut self, task: Task) -> bool {
        let Some(index) = self.tasks.iter().position(|t| t.id == task.id) else {
            return false;
        };
        Arc::make_mut(&mut self.tasks)[index] = task;
        self.set_view(View::All);
        true
    }

    pub fn remove(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        if self.tasks.iter().any(|t| t.id == id) {
            Arc::make_mut(&mut self.tasks).retain(|t| t.id != id);
        }
        self.set_view(View::All);
        self.tasks.len() != before
    }

    /// Flip completion locally and return the flipped task.
    ///
    /// The projection is reset to all tasks even when `id` is unknown.
    pub fn toggle(&mut self, id: TaskId) -> Option<Task> {
        let flipped = self.tasks.iter().position(|t| t.id == id).map(|index| {
            let tasks = Arc::make_mut(&mut self.tasks);
            tasks[index] = tasks[index].toggled();
            tasks[index].clone()
        });
        self.set_view(View::All);
        flipped
    }
}

/// Immutable copy of the store handed to readers
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub tasks: Arc<Vec<Task>>,
    pub displayed_tasks: Arc<Vec<Task>>,
    pub view: View,
    pub is_loading: bool,
    pub error: Option<String>,
    pub revision: u64,
}

impl From<&BoardState> for StoreSnapshot {
    fn from(state: &BoardState) -> Self {
        Self {
            tasks: Arc::clone(&state.tasks),
            displayed_tasks: Arc::clone(&state.displayed_tasks),
            view: state.view.clone(),
            is_loading: state.is_loading(),
            error: state.error.clone(),
            revision: state.revision,
        }
    }
}

/// Notification sent after every state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Changed { revision: u64 },
}
