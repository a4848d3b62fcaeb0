//! Sweep file loading
//!
//! ```yaml
//! scripts:
//!   run: ./train.sh
//! vars:
//!   - build
//!   - verbose: true
//!   - target: [x86, arm]
//! settings:
//!   output: discard
//!   step_delay_ms: 250
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use sweeprun_core::{ConfigError, OutputMode, SweepPlan, VarEntry, flatten_entries};

/// Scripts section of a sweep file
#[derive(Debug, Clone, Deserialize)]
pub struct Scripts {
    /// Executable run once per combination
    pub run: PathBuf,
}

/// Optional run settings; command line flags take precedence
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub output: OutputMode,
    pub step_delay_ms: Option<u64>,
}

/// A parsed sweep file
#[derive(Debug, Clone, Deserialize)]
pub struct SweepFile {
    pub scripts: Scripts,
    #[serde(default)]
    pub vars: Vec<VarEntry>,
    #[serde(default)]
    pub settings: Settings,
}

impl SweepFile {
    /// Parse a sweep file from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let file: SweepFile =
            serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;

        if file.scripts.run.as_os_str().is_empty() {
            return Err(ConfigError::MissingExecutable);
        }

        Ok(file)
    }

    /// Read and parse a sweep file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let file = Self::from_yaml(&content)?;
        tracing::debug!(
            path = %path.display(),
            script = %file.scripts.run.display(),
            vars = file.vars.len(),
            "Loaded sweep file"
        );
        Ok(file)
    }

    /// Executable to run for each combination
    pub fn executable(&self) -> &Path {
        &self.scripts.run
    }

    /// Classify the declarations and expand them into a plan
    pub fn plan(&self) -> Result<SweepPlan, ConfigError> {
        SweepPlan::from_declarations(&flatten_entries(self.vars.clone()))
    }
}
