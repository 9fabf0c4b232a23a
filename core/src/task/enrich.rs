//! Demo-field enrichment
//!
//! The remote resource only stores `{id, title, completed, userId}`. Every
//! record coming back from it is decorated with a description, a due date,
//! a status and a progress value so the rest of the app has something to
//! show.

use chrono::{Days, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use super::model::{Task, TaskStatus};

/// Due dates land within this many days from today
const DUE_WINDOW_DAYS: u64 = 7;

/// Decorates minimal repository records with demo fields
pub struct TaskEnricher {
    rng: Mutex<StdRng>,
}

impl Default for TaskEnricher {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskEnricher {
    /// Enricher seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic enricher for tests and reproducible demos
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map(Self::seeded).unwrap_or_default()
    }

    pub fn enrich(&self, task: Task) -> Task {
        self.enrich_on(task, Utc::now().date_naive())
    }

    /// Enrich relative to an explicit `today`.
    pub fn enrich_on(&self, mut task: Task, today: NaiveDate) -> Task {
        let mut rng = match self.rng.lock() {
            Ok(rng) => rng,
            Err(poisoned) => poisoned.into_inner(),
        };

        task.status = if task.completed {
            TaskStatus::Completed
        } else if rng.gen_bool(0.5) {
            TaskStatus::Pending
        } else {
            TaskStatus::InProgress
        };

        task.progress = match task.status {
            TaskStatus::Completed => 100,
            TaskStatus::InProgress => rng.gen_range(1..=99),
            TaskStatus::Pending => 0,
        };

        let offset = rng.gen_range(0..DUE_WINDOW_DAYS);
        task.due_date = today.checked_add_days(Days::new(offset)).or(Some(today));
        task.description = Some(format!("Task description for {}", task.title));
        task
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskId;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_completed_record_is_completed() {
        let enricher = TaskEnricher::seeded(1);
        let mut raw = Task::new(TaskId(1), "Ship it");
        raw.completed = true;

        let task = enricher.enrich_on(raw, today());
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.progress, 100);
        assert_eq!(task.description.as_deref(), Some("Task description for Ship it"));
    }

    #[test]
    fn test_enriched_records_are_consistent() {
        let enricher = TaskEnricher::seeded(7);
        let mut seen_pending = false;
        let mut seen_in_progress = false;

        for i in 0..200 {
            let task = enricher.enrich_on(Task::new(TaskId(i), format!("task {}", i)), today());
            assert!(task.is_consistent(), "inconsistent: {:?}", task);
            assert_ne!(task.status, TaskStatus::Completed);

            let due = task.due_date.unwrap();
            assert!(due >= today());
            assert!(due < today() + Days::new(DUE_WINDOW_DAYS));

            match task.status {
                TaskStatus::Pending => seen_pending = true,
                TaskStatus::InProgress => seen_in_progress = true,
                TaskStatus::Completed => {}
            }
        }

        assert!(seen_pending && seen_in_progress);
    }

    #[test]
    fn test_same_seed_same_output() {
        let a = TaskEnricher::seeded(99);
        let b = TaskEnricher::seeded(99);
        for i in 0..20 {
            let raw = Task::new(TaskId(i), "same");
            assert_eq!(a.enrich_on(raw.clone(), today()), b.enrich_on(raw, today()));
        }
    }
}
