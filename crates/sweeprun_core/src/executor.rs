//! Sweep executor
//!
//! Runs one invocation per combination, strictly in order. Each invocation
//! blocks the loop until the child exits. A child that exits unsuccessfully
//! is counted and logged but does not stop the sweep; a child that cannot be
//! started does.

use std::path::Path;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::SweepError;
use crate::launcher::Launcher;
use crate::plan::SweepPlan;
use crate::progress::SweepProgress;

/// Executor settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutorOptions {
    /// Pause before each step so a live view can show it
    pub step_delay: Duration,
}

/// Outcome of a sweep that ran to completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Invocations started
    pub launched: usize,
    /// Invocations that exited unsuccessfully
    pub failed: usize,
}

/// Run every combination of the plan against `executable`.
///
/// Cancellation is checked before each step, before progress is advanced, so
/// the progress columns always describe the last combination that actually
/// started. A cancelled sweep returns [`SweepError::Interrupted`].
pub fn run_sweep<L: Launcher + ?Sized>(
    plan: &SweepPlan,
    executable: &Path,
    launcher: &L,
    progress: Option<&SweepProgress>,
    options: &ExecutorOptions,
) -> Result<SweepSummary, SweepError> {
    let total = plan.len();
    let mut summary = SweepSummary::default();

    info!(
        executable = %executable.display(),
        combinations = total,
        "Starting sweep"
    );

    for (index, combination) in plan.combinations().iter().enumerate() {
        if !options.step_delay.is_zero() {
            thread::sleep(options.step_delay);
        }

        if progress.is_some_and(SweepProgress::is_cancelled) {
            warn!(step = index + 1, total, "Sweep cancelled");
            return Err(SweepError::Interrupted);
        }

        if let Some(p) = progress {
            p.advance(combination);
        }

        let invocation = plan.invocation(executable, combination);
        let command_line = invocation.command_line();
        if let Some(p) = progress {
            p.set_command(command_line.clone());
        }

        debug!(step = index + 1, total, command = %command_line, "Launching");

        let outcome = launcher
            .launch(&invocation)
            .map_err(|source| SweepError::Invocation {
                executable: executable.to_path_buf(),
                source,
            })?;
        summary.launched += 1;

        if !outcome.success() {
            summary.failed += 1;
            warn!(
                step = index + 1,
                code = ?outcome.code,
                command = %command_line,
                "Invocation exited unsuccessfully"
            );
        }

        if let Some(p) = progress {
            p.increment();
        }
    }

    info!(
        launched = summary.launched,
        failed = summary.failed,
        "Sweep complete"
    );
    Ok(summary)
}
