use serde::{Deserialize, Serialize};

use super::Scalar;

/// 1-based position of a value within its dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub current: usize,
    pub total: usize,
}

impl Position {
    /// Position used for everything that is not swept
    pub const SINGLE: Position = Position {
        current: 1,
        total: 1,
    };
}

/// One flag as it will appear in an invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub key: String,
    pub value: Scalar,
    pub position: Position,
}

impl Argument {
    /// A flag that appears unchanged in every invocation
    pub fn constant(key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            position: Position::SINGLE,
        }
    }

    /// Render as a command line flag.
    ///
    /// Booleans are presence-only: `true` and `false` both render as `--key`.
    pub fn to_flag(&self) -> String {
        if self.value.is_boolean() {
            format!("--{}", self.key)
        } else {
            format!("--{}={}", self.key, self.value)
        }
    }
}
