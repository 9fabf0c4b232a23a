//! Pagination module
//!
//! A growing prefix over the displayed tasks, advanced when a sentinel
//! element becomes visible.

mod viewport;
mod window;

pub use viewport::{ManualViewport, ObserverHandle, Sentinel, Viewport, VisibilityCallback};
pub use window::PaginationWindow;
