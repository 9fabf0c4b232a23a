//! Task store
//!
//! Single source of truth for tasks. All mutations go through the
//! repository; each reducer step is applied under the write lock, and the
//! lock is never held across a repository call, so concurrent operations
//! interleave by completion order.

use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use super::model::{BoardState, StoreEvent, StoreSnapshot, View};
use crate::task::{NewTask, Task, TaskId, TaskRepository};

const EVENT_CAPACITY: usize = 64;

/// Shared, cheap-to-clone handle to the task board
#[derive(Clone)]
pub struct TaskStore {
    state: Arc<RwLock<BoardState>>,
    repository: Arc<dyn TaskRepository>,
    event_tx: broadcast::Sender<StoreEvent>,
}

impl TaskStore {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(BoardState::new())),
            repository,
            event_tx,
        }
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.event_tx.subscribe()
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot::from(&*self.state.read().await)
    }

    async fn apply<R>(&self, reducer: impl FnOnce(&mut BoardState) -> R) -> R {
        let (out, revision) = {
            let mut state = self.state.write().await;
            let out = reducer(&mut state);
            (out, state.revision())
        };
        // No subscribers is fine.
        let _ = self.event_tx.send(StoreEvent::Changed { revision });
        out
    }

    async fn begin(&self, operation: &str) {
        debug!("{} pending", operation);
        self.apply(BoardState::begin).await;
    }

    async fn reject(&self, operation: &str, message: String) {
        warn!("{} rejected: {}", operation, message);
        self.apply(|state| state.reject(message)).await;
    }

    /// Replace all tasks with a fresh fetch, dropping any search or filter.
    pub async fn fetch_all(&self) {
        self.begin("fetch").await;
        match self.repository.list().await {
            Ok(tasks) => {
                info!("Fetched {} tasks", tasks.len());
                self.apply(|state| {
                    state.settle();
                    state.replace_all(tasks);
                })
                .await;
            }
            Err(e) => self.reject("fetch", e.to_string()).await,
        }
    }

    /// Fetch only when no tasks are loaded yet. Returns whether it fetched.
    pub async fn fetch_if_empty(&self) -> bool {
        if !self.state.read().await.tasks().is_empty() {
            return false;
        }
        self.fetch_all().await;
        true
    }

    /// Create a task and prepend it.
    ///
    /// A blank title is a silent no-op and returns `false`.
    pub async fn add(&self, input: NewTask) -> bool {
        if !input.has_title() {
            debug!("add skipped: blank title");
            return false;
        }

        self.begin("add").await;
        match self.repository.create(input).await {
            Ok(mut task) => {
                task.normalize();
                debug!("add fulfilled: {}", task.id);
                self.apply(|state| {
                    state.settle();
                    state.prepend(task);
                })
                .await;
            }
            Err(e) => self.reject("add", e.to_string()).await,
        }
        true
    }

    /// Persist `task` and replace the matching entry.
    ///
    /// If the task is gone by the time the call completes, nothing changes.
    pub async fn update(&self, mut task: Task) {
        task.normalize();
        let id = task.id;

        self.begin("update").await;
        match self.repository.update(task).await {
            Ok(mut updated) => {
                updated.normalize();
                let replaced = self
                    .apply(|state| {
                        state.settle();
                        state.replace(updated)
                    })
                    .await;
                if !replaced {
                    debug!("update of {} dropped: task no longer present", id);
                }
            }
            Err(e) => self.reject("update", e.to_string()).await,
        }
    }

    /// Delete a task. Unknown ids leave the task list as it is.
    pub async fn remove(&self, id: TaskId) {
        self.begin("delete").await;
        match self.repository.remove(id).await {
            Ok(removed) => {
                self.apply(|state| {
                    state.settle();
                    state.remove(removed);
                })
                .await;
            }
            Err(e) => self.reject("delete", e.to_string()).await,
        }
    }

    /// Search titles, replacing any active filter
    pub async fn search(&self, term: &str) {
        let view = View::search(term);
        self.apply(|state| state.set_view(view)).await;
    }

    /// Filter by status (`all` for everything), replacing any active search
    pub async fn filter(&self, status: &str) {
        let view = View::filter(status);
        self.apply(|state| state.set_view(view)).await;
    }

    /// Flip completion locally, then persist.
    ///
    /// The flip is visible before the repository call resolves and is not
    /// reverted if it fails.
    pub async fn toggle_completion(&self, id: TaskId) {
        let flipped = self.apply(|state| state.toggle(id)).await;
        if let Some(task) = flipped {
            self.update(task).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{InMemoryTaskRepository, TaskEnricher, TaskStatus};
    use crate::Result;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn demo_store(count: usize) -> (TaskStore, Arc<InMemoryTaskRepository>) {
        let repo = Arc::new(InMemoryTaskRepository::with_demo_tasks(
            count,
            TaskEnricher::seeded(5),
        ));
        (TaskStore::new(repo.clone()), repo)
    }

    /// Wraps the in-memory repository; update and remove wait for a permit.
    /// Updates echo the task back like a permissive remote would.
    struct GatedRepository {
        inner: InMemoryTaskRepository,
        update_gate: Notify,
        remove_gate: Notify,
    }

    impl GatedRepository {
        fn new(inner: InMemoryTaskRepository) -> Self {
            Self {
                inner,
                update_gate: Notify::new(),
                remove_gate: Notify::new(),
            }
        }
    }

    #[async_trait]
    impl TaskRepository for GatedRepository {
        async fn list(&self) -> Result<Vec<Task>> {
            self.inner.list().await
        }

        async fn create(&self, input: NewTask) -> Result<Task> {
            self.inner.create(input).await
        }

        async fn update(&self, task: Task) -> Result<Task> {
            self.update_gate.notified().await;
            self.inner.list().await?;
            Ok(task)
        }

        async fn remove(&self, id: TaskId) -> Result<TaskId> {
            self.remove_gate.notified().await;
            self.inner.remove(id).await
        }
    }

    async fn wait_until<F>(store: &TaskStore, condition: F)
    where
        F: Fn(&StoreSnapshot) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if condition(&store.snapshot().await) {
                    break;
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("condition not reached");
    }

    #[tokio::test]
    async fn test_fetch_all_loads_tasks() {
        let (store, _repo) = demo_store(3);

        assert!(store.fetch_if_empty().await);
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.displayed_tasks.len(), 3);
        assert!(!snapshot.is_loading);
        assert!(snapshot.error.is_none());

        // Already loaded: no refetch.
        assert!(!store.fetch_if_empty().await);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_tasks() {
        let (store, repo) = demo_store(3);
        store.fetch_all().await;

        repo.set_failure(Some("network down".to_string())).await;
        store.fetch_all().await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.tasks.len(), 3);
        assert_eq!(snapshot.error.as_deref(), Some("network down"));
        assert!(!snapshot.is_loading);

        repo.set_failure(None).await;
        store.fetch_all().await;
        assert!(store.snapshot().await.error.is_none());
    }

    #[tokio::test]
    async fn test_add_prepends_and_resets_filter() {
        let (store, _repo) = demo_store(3);
        store.fetch_all().await;
        store.filter("completed").await;

        assert!(store.add(NewTask::new("Fresh task")).await);

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.tasks.len(), 4);
        assert_eq!(snapshot.tasks[0].title, "Fresh task");
        assert_eq!(snapshot.view, View::All);
        assert_eq!(snapshot.displayed_tasks, snapshot.tasks);
    }

    #[tokio::test]
    async fn test_add_blank_title_is_noop() {
        let (store, repo) = demo_store(0);

        assert!(!store.add(NewTask::new("   ")).await);
        assert!(repo.is_empty().await);
        assert_eq!(store.snapshot().await.revision, 0);
    }

    #[tokio::test]
    async fn test_add_failure_sets_error() {
        let (store, repo) = demo_store(1);
        store.fetch_all().await;
        repo.set_failure(Some("create rejected".to_string())).await;

        store.add(NewTask::new("Won't land")).await;
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.tasks.len(), 1);
        assert_eq!(snapshot.error.as_deref(), Some("create rejected"));
    }

    #[tokio::test]
    async fn test_update_normalizes_and_resets_search() {
        let (store, _repo) = demo_store(3);
        store.fetch_all().await;
        store.search("milk").await;

        let mut task = store.snapshot().await.tasks[1].clone();
        task.title = "Renamed".to_string();
        task.status = TaskStatus::Completed;
        task.progress = 10;
        task.completed = false;
        store.update(task).await;

        let snapshot = store.snapshot().await;
        let updated = &snapshot.tasks[1];
        assert_eq!(updated.title, "Renamed");
        assert!(updated.completed);
        assert_eq!(updated.progress, 100);
        assert_eq!(snapshot.displayed_tasks, snapshot.tasks);
    }

    #[tokio::test]
    async fn test_remove_unknown_id_keeps_tasks() {
        let (store, _repo) = demo_store(3);
        store.fetch_all().await;
        let before = store.snapshot().await.tasks;

        store.remove(TaskId(999)).await;
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.tasks, before);
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn test_filter_scenario() {
        let repo = Arc::new(InMemoryTaskRepository::with_tasks(
            vec![Task::new(TaskId(1), "Buy milk")],
            TaskEnricher::seeded(1),
        ));
        let store = TaskStore::new(repo);
        store.fetch_all().await;

        store.filter("completed").await;
        assert!(store.snapshot().await.displayed_tasks.is_empty());

        store.filter("all").await;
        assert_eq!(store.snapshot().await.displayed_tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_is_optimistic_without_rollback() {
        let repo = Arc::new(GatedRepository::new(InMemoryTaskRepository::with_tasks(
            vec![Task::new(TaskId(1), "Buy milk")],
            TaskEnricher::seeded(1),
        )));
        let store = TaskStore::new(repo.clone());
        store.fetch_all().await;
        repo.inner.set_failure(Some("write failed".to_string())).await;

        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.toggle_completion(TaskId(1)).await }
        });

        wait_until(&store, |s| s.is_loading).await;
        let during = store.snapshot().await;
        assert!(during.tasks[0].completed);
        assert_eq!(during.tasks[0].status, TaskStatus::Completed);

        repo.update_gate.notify_one();
        pending.await.unwrap();

        let after = store.snapshot().await;
        assert_eq!(after.error.as_deref(), Some("write failed"));
        assert!(after.tasks[0].completed);
        assert!(!after.is_loading);
    }

    #[tokio::test]
    async fn test_delete_then_late_update_is_lost() {
        let repo = Arc::new(GatedRepository::new(InMemoryTaskRepository::with_demo_tasks(
            2,
            TaskEnricher::seeded(2),
        )));
        let store = TaskStore::new(repo.clone());
        store.fetch_all().await;

        let mut edited = store.snapshot().await.tasks[0].clone();
        edited.title = "Edited".to_string();
        let id = edited.id;

        let update = tokio::spawn({
            let store = store.clone();
            async move { store.update(edited).await }
        });
        let delete = tokio::spawn({
            let store = store.clone();
            async move { store.remove(id).await }
        });

        wait_until(&store, |s| s.is_loading).await;

        repo.remove_gate.notify_one();
        delete.await.unwrap();
        let mid = store.snapshot().await;
        assert!(mid.tasks.iter().all(|t| t.id != id));
        assert!(mid.is_loading, "update still in flight");

        repo.update_gate.notify_one();
        update.await.unwrap();

        let after = store.snapshot().await;
        assert_eq!(after.tasks.len(), 1);
        assert!(after.tasks.iter().all(|t| t.id != id));
        assert!(!after.is_loading);
        assert!(after.error.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_adds_all_land() {
        let (store, _repo) = demo_store(0);

        let adds = (0..5).map(|i| {
            let store = store.clone();
            async move { store.add(NewTask::new(format!("task {}", i))).await }
        });
        let results = futures::future::join_all(adds).await;
        assert!(results.into_iter().all(|dispatched| dispatched));

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.tasks.len(), 5);
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.displayed_tasks, snapshot.tasks);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let (store, _repo) = demo_store(2);
        let mut events = store.subscribe();

        store.fetch_all().await;
        store.search("buy").await;

        let mut last = 0;
        while let Ok(StoreEvent::Changed { revision }) = events.try_recv() {
            last = revision;
        }
        assert_eq!(last, store.snapshot().await.revision);
        assert_eq!(last, 2);
    }
}
