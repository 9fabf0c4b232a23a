//! Task module
//!
//! This module contains task-related types and the repository clients.

mod enrich;
mod http_repository;
mod memory_repository;
mod model;
mod repository;

pub use enrich::TaskEnricher;
pub use http_repository::HttpTaskRepository;
pub use memory_repository::InMemoryTaskRepository;
pub use model::*;
pub use repository::TaskRepository;
