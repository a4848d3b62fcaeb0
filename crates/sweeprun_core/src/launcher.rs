//! Process launching
//!
//! The executor talks to the OS through the [`Launcher`] trait so it can be
//! driven without spawning real processes.

use std::io;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::command::Invocation;

/// What happens to an invocation's stdout and stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Output is thrown away
    #[default]
    Discard,
    /// Output goes to this process's stdout/stderr
    Inherit,
}

/// How an invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
}

impl ExitOutcome {
    pub const SUCCESS: ExitOutcome = ExitOutcome { code: Some(0) };

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs one invocation to completion.
pub trait Launcher {
    /// Block until the invocation exits.
    ///
    /// An `Err` means the executable could not be started at all.
    fn launch(&self, invocation: &Invocation) -> io::Result<ExitOutcome>;
}

/// Launcher backed by `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher {
    output: OutputMode,
}

impl ProcessLauncher {
    pub fn new(output: OutputMode) -> Self {
        Self { output }
    }

    pub fn output(&self) -> OutputMode {
        self.output
    }

    fn stdio(&self) -> Stdio {
        match self.output {
            OutputMode::Discard => Stdio::null(),
            OutputMode::Inherit => Stdio::inherit(),
        }
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&self, invocation: &Invocation) -> io::Result<ExitOutcome> {
        // stdin stays detached so children never read keys meant for us
        let status = Command::new(&invocation.executable)
            .args(&invocation.argv)
            .stdin(Stdio::null())
            .stdout(self.stdio())
            .stderr(self.stdio())
            .status()?;

        Ok(ExitOutcome {
            code: status.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_mode_default() {
        assert_eq!(OutputMode::default(), OutputMode::Discard);
        assert_eq!(ProcessLauncher::default().output(), OutputMode::Discard);
    }

    #[test]
    fn test_exit_outcome() {
        assert!(ExitOutcome::SUCCESS.success());
        assert!(!ExitOutcome { code: Some(2) }.success());
        assert!(!ExitOutcome { code: None }.success());
    }

    #[test]
    fn test_missing_executable_fails_to_launch() {
        let invocation = Invocation {
            executable: "/nonexistent/sweeprun-test-script".into(),
            argv: vec![],
        };
        let err = ProcessLauncher::default().launch(&invocation).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
