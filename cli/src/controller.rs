//! REPL controller
//!
//! Turns typed commands into store intents and redraws the paginated list
//! whenever the store reports a change.

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use taskboard_core::board::TaskStore;
use taskboard_core::form::{Submission, TaskDraft};
use taskboard_core::pagination::{ManualViewport, PaginationWindow, Sentinel};
use taskboard_core::task::{Task, TaskId, TaskStatus};

use crate::command::{Command, EditField};
use crate::render;

/// The single sentinel: the row after the last rendered task
const LAST_ROW: Sentinel = Sentinel(0);

pub struct Controller {
    store: TaskStore,
    window: PaginationWindow<Task>,
    viewport: ManualViewport,
    rendered_revision: Option<u64>,
    last_error: Option<String>,
    was_loading: bool,
}

impl Controller {
    pub fn new(store: TaskStore, window: PaginationWindow<Task>) -> Self {
        Self {
            store,
            window,
            viewport: ManualViewport::new(),
            rendered_revision: None,
            last_error: None,
            was_loading: false,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        render::banner();
        render::help();

        let mut events = self.store.subscribe();
        self.spawn(|store| async move {
            store.fetch_if_empty().await;
        });

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let outcome = loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(_) | Err(RecvError::Lagged(_)) => self.refresh().await,
                    Err(RecvError::Closed) => break Ok(()),
                },
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if self.handle_line(&line).await {
                            break Ok(());
                        }
                    }
                    Ok(None) => break Ok(()),
                    Err(e) => break Err(anyhow!("failed to read input: {}", e)),
                },
            }
        };

        self.window.detach();
        outcome
    }

    fn spawn<F, Fut>(&self, op: F)
    where
        F: FnOnce(TaskStore) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(op(self.store.clone()));
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    /// Pull the latest snapshot; redraw if the displayed list changed.
    async fn refresh(&mut self) {
        let snapshot = self.store.snapshot().await;

        if snapshot.is_loading != self.was_loading {
            self.was_loading = snapshot.is_loading;
            if snapshot.is_loading {
                render::info("loading...");
            }
        }

        if snapshot.error != self.last_error {
            if let Some(message) = &snapshot.error {
                render::error(message);
            }
            self.last_error = snapshot.error.clone();
        }

        if self.rendered_revision != Some(snapshot.revision) {
            self.rendered_revision = Some(snapshot.revision);
            self.window.set_items(snapshot.displayed_tasks);
            self.draw();
        }
    }

    fn draw(&self) {
        let items = self.window.displayed_items();
        let has_more = self.window.has_more();
        render::page(&items, self.window.total_len(), has_more, Self::today());

        // Re-observe the last row every render; nothing to observe at the end.
        let sentinel = has_more.then_some(LAST_ROW);
        self.window.attach_sentinel(&self.viewport, sentinel);
    }

    /// Returns `true` when the user asked to quit.
    async fn handle_line(&mut self, line: &str) -> bool {
        if line.trim().is_empty() {
            return false;
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                render::error(&e.to_string());
                return false;
            }
        };
        debug!("command: {:?}", command);

        match command {
            Command::Add { due_date, title } => {
                let mut draft = TaskDraft::new();
                draft.title = title;
                draft.due_date = due_date;
                self.submit(draft);
            }
            Command::Edit { id, changes } => match self.find(id).await {
                Some(task) => match apply_changes(TaskDraft::edit(&task), &changes) {
                    Ok(draft) => self.submit(draft),
                    Err(e) => render::error(&e.to_string()),
                },
                None => render::error(&format!("no task #{}", id)),
            },
            Command::Delete(id) => self.spawn(move |store| async move { store.remove(id).await }),
            Command::Toggle(id) => {
                self.spawn(move |store| async move { store.toggle_completion(id).await })
            }
            Command::Search(term) => self.store.search(&term).await,
            Command::Filter(status) => self.store.filter(&status).await,
            Command::More => {
                if self.viewport.reveal(LAST_ROW) > 0 {
                    self.draw();
                } else {
                    render::info("nothing more to load");
                }
            }
            Command::List => self.draw(),
            Command::Help => render::help(),
            Command::Quit => return true,
        }
        false
    }

    fn submit(&self, draft: TaskDraft) {
        match draft.submit() {
            Ok(Submission::Create(input)) => self.spawn(move |store| async move {
                store.add(input).await;
            }),
            Ok(Submission::Update(task)) => {
                self.spawn(move |store| async move { store.update(task).await })
            }
            Err(errors) => render::error(&errors.to_string()),
        }
    }

    async fn find(&self, id: TaskId) -> Option<Task> {
        self.store
            .snapshot()
            .await
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }
}

fn apply_changes(mut draft: TaskDraft, changes: &[(EditField, String)]) -> Result<TaskDraft> {
    for (field, value) in changes {
        match field {
            EditField::Title => draft.title = value.clone(),
            EditField::Description => draft.description = value.clone(),
            EditField::DueDate => {
                draft.due_date = Some(
                    NaiveDate::parse_from_str(value, "%Y-%m-%d")
                        .map_err(|_| anyhow!("invalid date: {}", value))?,
                )
            }
            EditField::Status => draft.set_status(value.parse::<TaskStatus>()?),
            EditField::Progress => draft.set_progress(
                value
                    .parse::<u8>()
                    .map_err(|_| anyhow!("invalid progress: {}", value))?,
            ),
        }
    }
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> TaskDraft {
        let task = Task::new(TaskId(1), "Old")
            .with_due_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        TaskDraft::edit(&task)
    }

    #[test]
    fn test_apply_changes_in_order() {
        let changes = vec![
            (EditField::Title, "New title".to_string()),
            (EditField::Status, "in-progress".to_string()),
            (EditField::Progress, "45".to_string()),
            (EditField::DueDate, "2024-02-03".to_string()),
        ];
        let draft = apply_changes(draft(), &changes).unwrap();
        assert_eq!(draft.title, "New title");
        assert_eq!(draft.status, TaskStatus::InProgress);
        assert_eq!(draft.progress, 45);
        assert_eq!(draft.due_date, NaiveDate::from_ymd_opt(2024, 2, 3));
    }

    #[test]
    fn test_progress_ignored_unless_in_progress() {
        let changes = vec![(EditField::Progress, "45".to_string())];
        let draft = apply_changes(draft(), &changes).unwrap();
        assert_eq!(draft.progress, 0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(apply_changes(draft(), &[(EditField::Status, "done".to_string())]).is_err());
        assert!(apply_changes(draft(), &[(EditField::DueDate, "soon".to_string())]).is_err());
        assert!(apply_changes(draft(), &[(EditField::Progress, "300".to_string())]).is_err());
    }
}
