//! Pagination window
//!
//! Shows the first `page * items_per_page` entries of a backing sequence.
//! Replacing the backing sequence keeps the page; the prefix is clamped to
//! whatever is available.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::debug;

use super::viewport::{ObserverHandle, Sentinel, Viewport, VisibilityCallback};
use crate::{Error, Result};

struct WindowState<T> {
    items: Arc<Vec<T>>,
    page: usize,
    items_per_page: usize,
}

impl<T> WindowState<T> {
    fn depth(&self) -> usize {
        self.page.saturating_mul(self.items_per_page)
    }

    fn visible_len(&self) -> usize {
        self.depth().min(self.items.len())
    }

    fn has_more(&self) -> bool {
        self.depth() < self.items.len()
    }
}

struct WindowInner<T> {
    state: Mutex<WindowState<T>>,
    observer: Mutex<Option<ObserverHandle>>,
}

/// Growing prefix over a backing sequence
///
/// Clones share the same window. The sentinel observer is released when
/// it is replaced, when [`PaginationWindow::detach`] is called, and when
/// the last clone is dropped.
pub struct PaginationWindow<T> {
    inner: Arc<WindowInner<T>>,
}

impl<T> Clone for PaginationWindow<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

fn lock<S>(mutex: &Mutex<S>) -> MutexGuard<'_, S> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T> PaginationWindow<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(items_per_page: usize) -> Result<Self> {
        if items_per_page == 0 {
            return Err(Error::InvalidInput(
                "items per page must be positive".to_string(),
            ));
        }
        Ok(Self {
            inner: Arc::new(WindowInner {
                state: Mutex::new(WindowState {
                    items: Arc::new(Vec::new()),
                    page: 1,
                    items_per_page,
                }),
                observer: Mutex::new(None),
            }),
        })
    }

    /// Swap the backing sequence. The page is kept.
    pub fn set_items(&self, items: Arc<Vec<T>>) {
        let mut state = lock(&self.inner.state);
        state.items = items;
    }

    /// Advance one page if there is more to show
    pub fn load_more(&self) -> bool {
        let mut state = lock(&self.inner.state);
        if !state.has_more() {
            return false;
        }
        state.page += 1;
        debug!(
            "pagination advanced to page {} ({} of {} visible)",
            state.page,
            state.visible_len(),
            state.items.len()
        );
        true
    }

    pub fn displayed_items(&self) -> Vec<T> {
        let state = lock(&self.inner.state);
        state.items[..state.visible_len()].to_vec()
    }

    /// Length of the backing sequence
    pub fn total_len(&self) -> usize {
        lock(&self.inner.state).items.len()
    }

    pub fn has_more(&self) -> bool {
        lock(&self.inner.state).has_more()
    }

    pub fn page(&self) -> usize {
        lock(&self.inner.state).page
    }

    pub fn items_per_page(&self) -> usize {
        lock(&self.inner.state).items_per_page
    }

    /// Observe `sentinel` on `viewport`, replacing any previous observer.
    ///
    /// Passing `None` only releases the previous observer.
    pub fn attach_sentinel(&self, viewport: &dyn Viewport, sentinel: Option<Sentinel>) {
        let mut observer = lock(&self.inner.observer);
        if let Some(previous) = observer.take() {
            previous.disconnect();
        }

        if let Some(sentinel) = sentinel {
            let window: Weak<WindowInner<T>> = Arc::downgrade(&self.inner);
            let on_visible: VisibilityCallback = Arc::new(move || {
                if let Some(inner) = window.upgrade() {
                    PaginationWindow { inner }.load_more();
                }
            });
            *observer = Some(viewport.observe(sentinel, on_visible));
        }
    }

    /// Release the sentinel observer
    pub fn detach(&self) {
        if let Some(previous) = lock(&self.inner.observer).take() {
            previous.disconnect();
        }
    }

    pub fn is_observing(&self) -> bool {
        lock(&self.inner.observer).is_some()
    }
}
