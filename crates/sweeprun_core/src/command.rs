//! Command builder

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::combinations::Combination;
use crate::model::Argument;

/// One concrete run of the target executable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub executable: PathBuf,
    pub argv: Vec<String>,
}

impl Invocation {
    /// Executable followed by its arguments, separated by spaces.
    ///
    /// For display only; nothing is quoted.
    pub fn command_line(&self) -> String {
        let mut line = self.executable.display().to_string();
        for arg in &self.argv {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Merge constant flags, one combination and the positionals into an invocation.
///
/// argv order is constant flags, then the combination's arguments in
/// generator order, then positionals. Arguments are passed as a vector and
/// never go through a shell.
pub fn build_invocation(
    executable: &Path,
    constant_flags: &[Argument],
    combination: &Combination,
    positionals: &[String],
) -> Invocation {
    let mut argv = Vec::with_capacity(constant_flags.len() + combination.len() + positionals.len());
    argv.extend(constant_flags.iter().map(Argument::to_flag));
    argv.extend(combination.iter().map(Argument::to_flag));
    argv.extend(positionals.iter().cloned());

    Invocation {
        executable: executable.to_path_buf(),
        argv,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Position;

    fn swept(key: &str, value: &str, current: usize, total: usize) -> Argument {
        Argument {
            key: key.to_string(),
            value: value.into(),
            position: Position { current, total },
        }
    }

    #[test]
    fn test_argv_order() {
        let combination = Combination::new(vec![swept("mode", "debug", 1, 2), swept("target", "x86", 1, 2)]);
        let invocation = build_invocation(
            Path::new("./run"),
            &[Argument::constant("verbose", true), Argument::constant("jobs", 4)],
            &combination,
            &["build".to_string(), "all".to_string()],
        );

        assert_eq!(invocation.executable, PathBuf::from("./run"));
        assert_eq!(
            invocation.argv,
            vec!["--verbose", "--jobs=4", "--mode=debug", "--target=x86", "build", "all"]
        );
    }

    #[test]
    fn test_positionals_are_verbatim() {
        let invocation = build_invocation(
            Path::new("run.sh"),
            &[],
            &Combination::default(),
            &["--already-a-flag".to_string(), "a b".to_string()],
        );
        assert_eq!(invocation.argv, vec!["--already-a-flag", "a b"]);
    }

    #[test]
    fn test_command_line() {
        let invocation = Invocation {
            executable: PathBuf::from("./run"),
            argv: vec!["--x=1".to_string(), "go".to_string()],
        };
        assert_eq!(invocation.command_line(), "./run --x=1 go");
        assert_eq!(invocation.to_string(), "./run --x=1 go");

        let bare = Invocation {
            executable: PathBuf::from("./run"),
            argv: vec![],
        };
        assert_eq!(bare.command_line(), "./run");
    }
}
