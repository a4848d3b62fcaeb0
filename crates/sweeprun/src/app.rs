//! Runs a loaded sweep file end to end

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use sweeprun_core::{
    ExecutorOptions, ExitOutcome, Invocation, Launcher, OutputMode, ProcessLauncher, SweepPlan,
    SweepProgress, SweepSummary, run_sweep,
};

use crate::config::SweepFile;
use crate::lifecycle::Lifecycle;
use crate::render::{ProgressRenderer, REFRESH_INTERVAL};

/// Step delay used when neither the command line nor the file sets one
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(250);

/// Resolved run settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Hold the terminal in raw mode and draw the live view
    pub interactive: bool,
    pub output: OutputMode,
    pub step_delay: Duration,
}

impl RunOptions {
    /// Merge command line overrides over the file's settings
    pub fn resolve(
        file: &SweepFile,
        interactive: bool,
        show_output: bool,
        step_delay_ms: Option<u64>,
    ) -> Self {
        let output = if show_output {
            OutputMode::Inherit
        } else {
            file.settings.output
        };
        let step_delay = step_delay_ms
            .or(file.settings.step_delay_ms)
            .map_or(DEFAULT_STEP_DELAY, Duration::from_millis);

        Self {
            interactive,
            output,
            step_delay,
        }
    }
}

/// Writes each command line before launching it, for runs without the live view
struct EchoLauncher<L, W> {
    inner: L,
    out: Mutex<W>,
}

impl<L, W> EchoLauncher<L, W> {
    fn new(inner: L, out: W) -> Self {
        Self {
            inner,
            out: Mutex::new(out),
        }
    }
}

impl<L: Launcher, W: Write> Launcher for EchoLauncher<L, W> {
    fn launch(&self, invocation: &Invocation) -> io::Result<ExitOutcome> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{invocation}") {
            tracing::warn!("Failed to echo command: {e}");
        }
        drop(out);

        self.inner.launch(invocation)
    }
}

/// Print every invocation of the plan, one per line, without running anything.
pub fn dry_run(file: &SweepFile, plan: &SweepPlan, out: &mut impl Write) -> io::Result<()> {
    for invocation in plan.invocations(file.executable()) {
        writeln!(out, "{invocation}")?;
    }
    Ok(())
}

/// Run the sweep under the lifecycle controller.
///
/// Interrupts end the process from inside the lifecycle's handlers, so this
/// only returns once the sweep completed or failed.
pub fn run(
    file: &SweepFile,
    plan: &SweepPlan,
    options: &RunOptions,
) -> color_eyre::Result<SweepSummary> {
    let progress = SweepProgress::for_plan(plan);
    let mut lifecycle = Lifecycle::new(progress.clone());
    lifecycle.install_signal_handlers()?;

    // Raw mode and the viewport must exist before keys are read
    let renderer = if options.interactive {
        lifecycle.acquire_terminal()?;
        Some(ProgressRenderer::spawn(
            progress.clone(),
            lifecycle.view_gate(),
            REFRESH_INTERVAL,
        )?)
    } else {
        None
    };
    lifecycle.start()?;

    let launcher = ProcessLauncher::new(options.output);
    let executor_options = ExecutorOptions {
        step_delay: options.step_delay,
    };
    let sweep = |launcher: &dyn Launcher| {
        run_sweep(
            plan,
            file.executable(),
            launcher,
            Some(&progress),
            &executor_options,
        )
    };
    let result = if options.interactive {
        sweep(&launcher)
    } else {
        sweep(&EchoLauncher::new(launcher, io::stderr()))
    };

    if let Some(renderer) = renderer {
        if let Err(e) = renderer.stop() {
            tracing::warn!("Progress view failed: {e}");
        }
    }
    let state = lifecycle.finish();
    if options.interactive {
        println!();
    }
    tracing::debug!(?state, "Lifecycle finished");

    Ok(result?)
}
