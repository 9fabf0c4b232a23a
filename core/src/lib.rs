//! Core library for Taskboard
//!
//! This crate contains the client-side state core, including:
//! - Task model and repository clients
//! - The task store and its displayed projection
//! - The pagination window used for incremental rendering
//! - Edit form validation

pub mod board;
pub mod config;
pub mod error;
pub mod form;
pub mod pagination;
pub mod task;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
