//! Lifecycle controller
//!
//! Owns the terminal for the duration of a sweep and turns interrupt-class
//! signals and keys into an immediate process exit.
//!
//! ```text
//! Idle -> Running -> Completed
//!                 \-> Interrupted
//! ```
//!
//! Both terminal states restore the terminal: the interrupt path closes the
//! live view and releases raw mode itself before exiting, through the same
//! idempotent guard the normal path uses. Signal handlers go in before raw
//! mode is taken, so there is no window where a signal finds the terminal
//! raw and nobody to restore it.

use std::io;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{cursor, execute, terminal};
use sweeprun_core::{SweepError, SweepProgress};

use crate::render::ViewGate;

/// How often the key listener checks for shutdown
const KEY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Process exit status of a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepExit {
    Completed,
    ConfigError,
    InvocationError,
    Interrupted,
}

impl SweepExit {
    pub fn code(self) -> u8 {
        match self {
            SweepExit::Completed => 0,
            SweepExit::ConfigError => 2,
            SweepExit::InvocationError => 3,
            SweepExit::Interrupted => 130,
        }
    }

    /// Exit status matching a sweep error
    pub fn for_error(error: &SweepError) -> Self {
        match error {
            SweepError::Config(_) => SweepExit::ConfigError,
            SweepError::Invocation { .. } => SweepExit::InvocationError,
            SweepError::Interrupted => SweepExit::Interrupted,
        }
    }
}

impl From<SweepExit> for ExitCode {
    fn from(exit: SweepExit) -> Self {
        ExitCode::from(exit.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Running,
    Completed,
    Interrupted,
}

impl LifecycleState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LifecycleState::Completed | LifecycleState::Interrupted)
    }

    /// Next state, or `None` for a transition that is not allowed
    pub fn transition(self, to: LifecycleState) -> Option<LifecycleState> {
        use LifecycleState::*;
        match (self, to) {
            (Idle, Running) | (Running, Completed) => Some(to),
            // A signal can arrive before the sweep loop starts
            (Idle | Running, Interrupted) => Some(to),
            _ => None,
        }
    }
}

/// Raw terminal mode, released at most once
///
/// Taking and releasing raw mode are serialized, so a release racing an
/// acquire never leaves the terminal raw.
#[derive(Debug, Default)]
pub struct TerminalGuard {
    raw: Mutex<bool>,
}

impl TerminalGuard {
    /// A guard that holds nothing yet
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.raw.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Put the terminal into raw mode
    pub fn acquire(&self) -> io::Result<()> {
        let mut raw = self.lock();
        if !*raw {
            terminal::enable_raw_mode()?;
            *raw = true;
        }
        Ok(())
    }

    pub fn is_raw(&self) -> bool {
        *self.lock()
    }

    /// Restore the terminal. Safe to call from any thread, any number of times.
    pub fn release(&self) {
        let mut raw = self.lock();
        if !*raw {
            return;
        }
        *raw = false;
        if let Err(e) = terminal::disable_raw_mode() {
            tracing::error!("Failed to restore terminal: {e}");
        }
        if let Err(e) = execute!(io::stdout(), cursor::Show) {
            tracing::error!("Failed to show cursor: {e}");
        }
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        self.release();
    }
}

/// Keys that abort the sweep while raw mode swallows the terminal's own signals
pub fn is_interrupt_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        // Ctrl-\ arrives as Ctrl-4 on most terminals
        KeyCode::Char('c' | '\\' | '4') => key.modifiers.contains(KeyModifiers::CONTROL),
        KeyCode::Char('q') => key.modifiers.is_empty(),
        _ => false,
    }
}

/// State shared with the signal handlers and key listener
#[derive(Clone)]
struct InterruptContext {
    state: Arc<Mutex<LifecycleState>>,
    terminal: Arc<TerminalGuard>,
    view: ViewGate,
    progress: SweepProgress,
}

impl InterruptContext {
    /// Cancel, stop drawing and restore the terminal
    fn shut_down(&self) {
        self.progress.cancel();
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(next) = state.transition(LifecycleState::Interrupted) {
                *state = next;
            }
        }
        // A frame drawn after release would hide the cursor again
        self.view.close();
        self.terminal.release();
    }

    /// Shut down and exit without unwinding.
    ///
    /// In-flight children are not killed.
    fn interrupt(&self, source: &str) -> ! {
        self.shut_down();

        let snapshot = self.progress.snapshot();
        tracing::warn!(
            source,
            completed = snapshot.completed,
            total = snapshot.total,
            "Sweep interrupted"
        );
        eprintln!("\nInterrupted after {}/{} runs", snapshot.completed, snapshot.total);

        std::process::exit(i32::from(SweepExit::Interrupted.code()));
    }
}

/// Route SIGQUIT, which `ctrlc` leaves alone, through the interrupt path
#[cfg(unix)]
fn spawn_quit_listener(context: InterruptContext) -> io::Result<()> {
    use signal_hook::consts::SIGQUIT;
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGQUIT])?;
    thread::Builder::new()
        .name("sweeprun-signals".to_string())
        .spawn(move || {
            if signals.forever().next().is_some() {
                context.interrupt("SIGQUIT");
            }
        })?;
    Ok(())
}

/// Supervises terminal mode and interrupt handling around a sweep
pub struct Lifecycle {
    context: InterruptContext,
    stop: Arc<AtomicBool>,
    key_listener: Option<JoinHandle<()>>,
}

impl Lifecycle {
    pub fn new(progress: SweepProgress) -> Self {
        Self {
            context: InterruptContext {
                state: Arc::new(Mutex::new(LifecycleState::Idle)),
                terminal: Arc::new(TerminalGuard::new()),
                view: ViewGate::new(),
                progress,
            },
            stop: Arc::new(AtomicBool::new(false)),
            key_listener: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        *self
            .context
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Gate the live view must draw through
    pub fn view_gate(&self) -> ViewGate {
        self.context.view.clone()
    }

    /// Route interrupt, terminate, hangup and quit signals to the interrupt path.
    ///
    /// Call once per process, before [`Lifecycle::acquire_terminal`].
    pub fn install_signal_handlers(&self) -> color_eyre::Result<()> {
        let context = self.context.clone();
        ctrlc::set_handler(move || context.interrupt("signal"))?;

        #[cfg(unix)]
        spawn_quit_listener(self.context.clone())?;

        tracing::debug!("Signal handlers installed");
        Ok(())
    }

    /// Take raw mode for the live view. Call before the view is created.
    pub fn acquire_terminal(&self) -> io::Result<()> {
        self.context.terminal.acquire()?;
        tracing::debug!("Terminal in raw mode");
        Ok(())
    }

    /// Enter `Running`, listening for interrupt keys while raw mode is held.
    ///
    /// Call after the live view exists, so the key listener never competes
    /// with its cursor query.
    pub fn start(&mut self) -> io::Result<()> {
        if self.context.terminal.is_raw() {
            self.key_listener = Some(self.spawn_key_listener()?);
        }

        self.set_state(LifecycleState::Running);
        Ok(())
    }

    fn spawn_key_listener(&self) -> io::Result<JoinHandle<()>> {
        let context = self.context.clone();
        let stop = self.stop.clone();

        thread::Builder::new()
            .name("sweeprun-keys".to_string())
            .spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    match event::poll(KEY_POLL_INTERVAL) {
                        Ok(true) => match event::read() {
                            Ok(Event::Key(key)) if is_interrupt_key(&key) => {
                                context.interrupt("key");
                            }
                            Ok(_) => {}
                            Err(e) => {
                                tracing::warn!("Key listener stopped: {e}");
                                break;
                            }
                        },
                        Ok(false) => {}
                        Err(e) => {
                            tracing::warn!("Key listener stopped: {e}");
                            break;
                        }
                    }
                }
            })
    }

    /// Stop listening, restore the terminal and enter `Completed`.
    pub fn finish(mut self) -> LifecycleState {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.key_listener.take() {
            if handle.join().is_err() {
                tracing::error!("Key listener panicked");
            }
        }
        self.context.terminal.release();
        self.set_state(LifecycleState::Completed);
        self.state()
    }

    fn set_state(&self, to: LifecycleState) {
        let mut state = self
            .context
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match state.transition(to) {
            Some(next) => *state = next,
            None => tracing::warn!(from = ?*state, to = ?to, "Ignoring lifecycle transition"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweeprun_core::{ConfigError, SweepPlan};

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            SweepExit::Completed.code(),
            SweepExit::ConfigError.code(),
            SweepExit::InvocationError.code(),
            SweepExit::Interrupted.code(),
        ];
        assert_eq!(codes, [0, 2, 3, 130]);
    }

    #[test]
    fn test_exit_for_error() {
        assert_eq!(
            SweepExit::for_error(&SweepError::Config(ConfigError::MissingExecutable)),
            SweepExit::ConfigError
        );
        assert_eq!(
            SweepExit::for_error(&SweepError::Invocation {
                executable: "x".into(),
                source: io::Error::from(io::ErrorKind::NotFound),
            }),
            SweepExit::InvocationError
        );
        assert_eq!(
            SweepExit::for_error(&SweepError::Interrupted),
            SweepExit::Interrupted
        );
    }

    #[test]
    fn test_transitions() {
        use LifecycleState::*;

        assert_eq!(Idle.transition(Running), Some(Running));
        assert_eq!(Running.transition(Completed), Some(Completed));
        assert_eq!(Running.transition(Interrupted), Some(Interrupted));
        assert_eq!(Idle.transition(Interrupted), Some(Interrupted));

        assert_eq!(Idle.transition(Completed), None);
        assert_eq!(Completed.transition(Running), None);
        assert_eq!(Interrupted.transition(Completed), None);
        assert_eq!(Completed.transition(Interrupted), None);

        assert!(Completed.is_terminal());
        assert!(Interrupted.is_terminal());
        assert!(!Running.is_terminal());
    }

    #[test]
    fn test_interrupt_keys() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let ctrl_backslash = KeyEvent::new(KeyCode::Char('\\'), KeyModifiers::CONTROL);
        let q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(is_interrupt_key(&ctrl_c));
        assert!(is_interrupt_key(&ctrl_backslash));
        assert!(is_interrupt_key(&q));

        let plain_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        let mut release = ctrl_c;
        release.kind = KeyEventKind::Release;
        assert!(!is_interrupt_key(&plain_c));
        assert!(!is_interrupt_key(&enter));
        assert!(!is_interrupt_key(&release));
    }

    #[test]
    fn test_unacquired_guard_release_is_noop() {
        let guard = TerminalGuard::new();
        assert!(!guard.is_raw());
        guard.release();
        guard.release();
        assert!(!guard.is_raw());
    }

    #[test]
    fn test_shut_down_cancels_and_closes_view() {
        let plan = SweepPlan::from_declarations(&[]).unwrap();
        let progress = SweepProgress::for_plan(&plan);
        let lifecycle = Lifecycle::new(progress.clone());
        let gate = lifecycle.view_gate();

        lifecycle.context.shut_down();

        assert!(progress.is_cancelled());
        assert!(gate.is_closed());
        assert!(!lifecycle.context.terminal.is_raw());
        assert_eq!(lifecycle.state(), LifecycleState::Interrupted);
    }

    #[test]
    fn test_finish_after_interrupt_stays_interrupted() {
        let plan = SweepPlan::from_declarations(&[]).unwrap();
        let mut lifecycle = Lifecycle::new(SweepProgress::for_plan(&plan));
        lifecycle.start().unwrap();
        assert_eq!(lifecycle.state(), LifecycleState::Running);

        lifecycle.context.shut_down();
        assert_eq!(lifecycle.finish(), LifecycleState::Interrupted);
    }

    #[test]
    fn test_finish_without_start_is_ignored() {
        let plan = SweepPlan::from_declarations(&[]).unwrap();
        let lifecycle = Lifecycle::new(SweepProgress::for_plan(&plan));

        assert_eq!(lifecycle.state(), LifecycleState::Idle);
        // Idle -> Completed is not a legal transition
        assert_eq!(lifecycle.finish(), LifecycleState::Idle);
    }
}
