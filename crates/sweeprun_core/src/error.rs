use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors raised while reading or classifying a sweep declaration.
///
/// All of these are fatal before any invocation runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The sweep file could not be read
    Io { path: PathBuf, message: String },
    /// The sweep file is not valid or does not have the expected shape
    Parse(String),
    /// A swept flag declared no values, so it cannot form a dimension
    EmptyDimension { key: String },
    /// No executable was named for the sweep
    MissingExecutable,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, message } => {
                write!(f, "failed to read {}: {message}", path.display())
            }
            ConfigError::Parse(msg) => write!(f, "invalid sweep file: {msg}"),
            ConfigError::EmptyDimension { key } => {
                write!(f, "swept flag '{key}' must list at least one value")
            }
            ConfigError::MissingExecutable => write!(f, "no script to run was configured"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that stop a sweep.
#[derive(Debug)]
pub enum SweepError {
    Config(ConfigError),
    /// The executable could not be located or started
    Invocation {
        executable: PathBuf,
        source: io::Error,
    },
    /// The sweep was cancelled by the user or the OS
    Interrupted,
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepError::Config(e) => write!(f, "configuration error: {e}"),
            SweepError::Invocation { executable, source } => {
                write!(f, "failed to start {}: {source}", executable.display())
            }
            SweepError::Interrupted => write!(f, "sweep interrupted"),
        }
    }
}

impl std::error::Error for SweepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SweepError::Config(e) => Some(e),
            SweepError::Invocation { source, .. } => Some(source),
            SweepError::Interrupted => None,
        }
    }
}

impl From<ConfigError> for SweepError {
    fn from(e: ConfigError) -> Self {
        SweepError::Config(e)
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::EmptyDimension {
            key: "mode".to_string(),
        };
        assert_eq!(err.to_string(), "swept flag 'mode' must list at least one value");

        let err = ConfigError::Io {
            path: PathBuf::from("sample.yml"),
            message: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "failed to read sample.yml: not found");
    }

    #[test]
    fn test_sweep_error_source() {
        use std::error::Error;

        let err = SweepError::from(ConfigError::MissingExecutable);
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("configuration error"));

        assert!(SweepError::Interrupted.source().is_none());
    }
}
