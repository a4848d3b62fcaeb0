//! Progress tracking for a running sweep
//!
//! [`SweepProgress`] is a clonable handle over shared atomics. The executor
//! writes to it; renderers read [`SweepProgress::snapshot`] from another
//! thread; an interrupt handler flips the cancellation flag.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::combinations::Combination;
use crate::plan::SweepPlan;

#[derive(Debug)]
struct Column {
    label: String,
    total: usize,
    current: AtomicUsize,
}

/// Progress tracking for a sweep
#[derive(Debug, Clone)]
pub struct SweepProgress {
    /// One column per dimension, in combination order
    columns: Arc<Vec<Column>>,
    /// Completed invocations
    completed: Arc<AtomicUsize>,
    /// Total invocations
    total: Arc<AtomicUsize>,
    /// Cancellation flag
    cancelled: Arc<AtomicBool>,
    /// Command line of the most recent step
    command: Arc<Mutex<Option<String>>>,
}

impl SweepProgress {
    /// Create a tracker with columns laid out from the plan's first combination.
    ///
    /// Every later combination is assumed to share that column-to-dimension
    /// mapping. A plan without dimensions gets no columns.
    #[must_use]
    pub fn for_plan(plan: &SweepPlan) -> Self {
        let columns: Vec<Column> = plan
            .first()
            .map(|first| {
                first
                    .iter()
                    .map(|arg| Column {
                        label: arg.key.clone(),
                        total: arg.position.total,
                        current: AtomicUsize::new(0),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            columns: Arc::new(columns),
            completed: Arc::new(AtomicUsize::new(0)),
            total: Arc::new(AtomicUsize::new(plan.len())),
            cancelled: Arc::new(AtomicBool::new(false)),
            command: Arc::new(Mutex::new(None)),
        }
    }

    /// Number of progress columns
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns.len()
    }

    /// Move every column to the position of its argument in `combination`.
    pub fn advance(&self, combination: &Combination) {
        for (column, arg) in self.columns.iter().zip(combination) {
            debug_assert_eq!(column.label, arg.key, "combination columns out of order");
            column.current.store(arg.position.current, Ordering::Relaxed);
        }
    }

    /// Record the command line of the step about to run
    pub fn set_command(&self, command: String) {
        *self.command.lock().unwrap_or_else(PoisonError::into_inner) = Some(command);
    }

    /// Get the number of completed invocations
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Get the total number of invocations
    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Increment the completed counter
    pub fn increment(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Cancel the sweep
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Check if cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Copy the current state for rendering
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            columns: self
                .columns
                .iter()
                .map(|c| ColumnSnapshot {
                    label: c.label.clone(),
                    current: c.current.load(Ordering::Relaxed),
                    total: c.total,
                })
                .collect(),
            completed: self.completed(),
            total: self.total(),
            command: self
                .command
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            cancelled: self.is_cancelled(),
        }
    }
}

/// State of one progress column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSnapshot {
    pub label: String,
    pub current: usize,
    pub total: usize,
}

impl ColumnSnapshot {
    /// Fraction in `[0, 1]`
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.current.min(self.total) as f64) / (self.total as f64)
    }
}

/// Point-in-time copy of [`SweepProgress`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub columns: Vec<ColumnSnapshot>,
    pub completed: usize,
    pub total: usize,
    pub command: Option<String>,
    pub cancelled: bool,
}

impl ProgressSnapshot {
    /// Overall fraction of invocations completed, in `[0, 1]`
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.completed.min(self.total) as f64) / (self.total as f64)
    }
}
