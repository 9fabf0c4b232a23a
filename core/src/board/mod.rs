//! Task board module
//!
//! The store owning the canonical task list and its displayed projection.

mod model;
mod store;

pub use model::{project, BoardState, StatusFilter, StoreEvent, StoreSnapshot, View};
pub use store::TaskStore;
