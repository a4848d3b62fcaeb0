use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sweeprun::{LogTarget, RunOptions, SweepExit, SweepFile, dry_run, init_logging, run};
use sweeprun_core::{ConfigError, SweepError};

#[derive(Parser, Debug)]
#[command(name = "sweeprun")]
#[command(about = "Run an executable once for every combination of swept flags")]
struct Args {
    /// Path to the sweep file
    #[arg(default_value = "sample.yml")]
    config: PathBuf,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Log file (default: sweeprun.log while the live view is shown, stderr otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Do not draw the live progress view
    #[arg(long)]
    no_progress: bool,

    /// Let the executable write to this terminal
    #[arg(long)]
    show_output: bool,

    /// Pause before each run, in milliseconds
    #[arg(long)]
    step_delay_ms: Option<u64>,

    /// Print the command lines without running them
    #[arg(long)]
    dry_run: bool,
}

/// Map a failure to its exit status, if it is one we know.
fn exit_for(report: &color_eyre::Report) -> Option<SweepExit> {
    if let Some(error) = report.downcast_ref::<SweepError>() {
        return Some(SweepExit::for_error(error));
    }
    report
        .downcast_ref::<ConfigError>()
        .map(|_| SweepExit::ConfigError)
}

fn sweep(args: &Args, interactive: bool) -> color_eyre::Result<()> {
    let file = SweepFile::load(&args.config)?;
    let plan = file.plan()?;
    tracing::info!(
        script = %file.executable().display(),
        runs = plan.len(),
        "Sweep planned"
    );

    if args.dry_run {
        return Ok(dry_run(&file, &plan, &mut io::stdout().lock())?);
    }

    let options = RunOptions::resolve(&file, interactive, args.show_output, args.step_delay_ms);
    let summary = run(&file, &plan, &options)?;

    tracing::info!(
        launched = summary.launched,
        failed = summary.failed,
        "Sweep completed"
    );
    println!(
        "Completed {} runs ({} failed)",
        summary.launched, summary.failed
    );
    Ok(())
}

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let args = Args::parse();
    let interactive = !args.no_progress && !args.dry_run && io::stdout().is_terminal();

    let target = match (&args.log_file, interactive) {
        (Some(path), _) => LogTarget::File(path.clone()),
        (None, true) => LogTarget::File(PathBuf::from("sweeprun.log")),
        (None, false) => LogTarget::Stderr,
    };
    init_logging(&target, &args.log_level)?;

    match sweep(&args, interactive) {
        Ok(()) => Ok(SweepExit::Completed.into()),
        Err(report) => match exit_for(&report) {
            Some(exit) => {
                tracing::error!("{report}");
                eprintln!("Error: {report}");
                Ok(exit.into())
            }
            None => Err(report),
        },
    }
}
