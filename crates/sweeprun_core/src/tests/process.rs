//! Sweeps that spawn real child processes

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::executor::{ExecutorOptions, run_sweep};
use crate::launcher::{OutputMode, ProcessLauncher};
use crate::model::ParameterDeclaration;
use crate::plan::SweepPlan;

/// Write an executable shell script into `dir`
fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn test_each_combination_runs_with_its_argv() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("calls.log");
    let run = script(
        dir.path(),
        "run.sh",
        &format!("echo \"$@\" >> '{}'", log.display()),
    );

    let plan = SweepPlan::from_declarations(&[
        ParameterDeclaration::constant("quiet", true),
        ParameterDeclaration::swept("n", [1, 2]),
        ParameterDeclaration::swept("name", ["a b", "c"]),
        ParameterDeclaration::positional("out"),
    ])
    .unwrap();

    let summary = run_sweep(
        &plan,
        &run,
        &ProcessLauncher::new(OutputMode::Discard),
        None,
        &ExecutorOptions::default(),
    )
    .unwrap();

    assert_eq!(summary.launched, 4);
    assert_eq!(summary.failed, 0);

    let calls = fs::read_to_string(&log).unwrap();
    let lines: Vec<_> = calls.lines().collect();
    assert_eq!(
        lines,
        vec![
            "--quiet --name=a b --n=1 out",
            "--quiet --name=c --n=1 out",
            "--quiet --name=a b --n=2 out",
            "--quiet --name=c --n=2 out",
        ]
    );
}

#[test]
fn test_nonzero_exit_is_counted() {
    let dir = TempDir::new().unwrap();
    let run = script(dir.path(), "fail.sh", "[ \"$1\" = \"--code=0\" ] || exit 3");

    let plan =
        SweepPlan::from_declarations(&[ParameterDeclaration::swept("code", [0, 1, 2])]).unwrap();

    let summary = run_sweep(
        &plan,
        &run,
        &ProcessLauncher::default(),
        None,
        &ExecutorOptions::default(),
    )
    .unwrap();

    assert_eq!(summary.launched, 3);
    assert_eq!(summary.failed, 2);
}
