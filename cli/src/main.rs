//! Taskboard terminal client
//!
//! Entry point: configures logging, picks a repository and hands the store
//! to the REPL controller.

mod command;
mod controller;
mod render;

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskboard_core::board::TaskStore;
use taskboard_core::config::ClientConfig;
use taskboard_core::pagination::PaginationWindow;
use taskboard_core::task::{HttpTaskRepository, InMemoryTaskRepository, TaskEnricher, TaskRepository};

use crate::controller::Controller;

/// Demo tasks seeded in offline mode
const OFFLINE_TASKS: usize = 36;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they stay out of the rendered list
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard=info,taskboard_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env();

    let repository: Arc<dyn TaskRepository> = if config.offline {
        tracing::info!("Offline mode: {} demo tasks in memory", OFFLINE_TASKS);
        Arc::new(InMemoryTaskRepository::with_demo_tasks(
            OFFLINE_TASKS,
            TaskEnricher::from_seed(config.seed),
        ))
    } else {
        let repository = HttpTaskRepository::from_config(&config);
        tracing::info!("Using task repository at {}", repository.base_url());
        Arc::new(repository)
    };

    let store = TaskStore::new(repository);
    let window = PaginationWindow::new(config.page_size)?;

    Controller::new(store, window).run().await
}
