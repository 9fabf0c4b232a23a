//! Viewport visibility observation

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Marker for the element whose visibility advances the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sentinel(pub u64);

pub type VisibilityCallback = Arc<dyn Fn() + Send + Sync>;

/// Something that reports when a sentinel scrolls into view
pub trait Viewport: Send + Sync {
    /// Register `on_visible` for `sentinel`. The registration lives as long
    /// as the returned handle.
    fn observe(&self, sentinel: Sentinel, on_visible: VisibilityCallback) -> ObserverHandle;
}

/// Live observer registration; disconnects when dropped
pub struct ObserverHandle {
    disconnect: Option<Box<dyn FnOnce() + Send>>,
}

impl ObserverHandle {
    pub fn new(disconnect: impl FnOnce() + Send + 'static) -> Self {
        Self {
            disconnect: Some(Box::new(disconnect)),
        }
    }

    pub fn disconnect(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(disconnect) = self.disconnect.take() {
            disconnect();
        }
    }
}

impl Drop for ObserverHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ObserverHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverHandle")
            .field("connected", &self.disconnect.is_some())
            .finish()
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    observers: HashMap<u64, (Sentinel, VisibilityCallback)>,
}

/// Viewport driven by explicit [`ManualViewport::reveal`] calls
#[derive(Clone, Default)]
pub struct ManualViewport {
    registry: Arc<Mutex<Registry>>,
}

impl ManualViewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `sentinel` as visible; returns how many observers fired
    pub fn reveal(&self, sentinel: Sentinel) -> usize {
        // Callbacks may re-attach, so they run with the registry unlocked.
        let callbacks: Vec<VisibilityCallback> = {
            let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry
                .observers
                .values()
                .filter(|(observed, _)| *observed == sentinel)
                .map(|(_, callback)| Arc::clone(callback))
                .collect()
        };
        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }

    pub fn active_observers(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observers
            .len()
    }
}

impl Viewport for ManualViewport {
    fn observe(&self, sentinel: Sentinel, on_visible: VisibilityCallback) -> ObserverHandle {
        let id = {
            let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.observers.insert(id, (sentinel, on_visible));
            id
        };

        let registry = Arc::downgrade(&self.registry);
        ObserverHandle::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .observers
                    .remove(&id);
            }
        })
    }
}
