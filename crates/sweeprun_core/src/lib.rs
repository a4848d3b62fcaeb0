//! Combinatorial sweep engine
//!
//! This crate turns a list of parameter declarations into every combination
//! of their swept values and runs an external executable once per
//! combination. It provides:
//! - Declaration model with loosely typed scalar values
//! - Matrix builder splitting constant flags, positionals and swept dimensions
//! - Cartesian-product generator with stable column order
//! - Command builder producing argv vectors
//! - Shared progress state with cancellation
//! - Sequential executor behind a process-launching trait
//!
//! ```ignore
//! use sweeprun_core::{ParameterDeclaration, SweepPlan, SweepProgress, ProcessLauncher};
//!
//! let plan = SweepPlan::from_declarations(&[
//!     ParameterDeclaration::positional("build"),
//!     ParameterDeclaration::swept("target", ["x86", "arm"]),
//! ])?;
//! let progress = SweepProgress::for_plan(&plan);
//! let summary = run_sweep(&plan, "./run".as_ref(), &ProcessLauncher::default(), Some(&progress), &Default::default())?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod combinations;
pub mod command;
pub mod error;
pub mod executor;
pub mod launcher;
pub mod matrix;
pub mod plan;
pub mod progress;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use combinations::{Combination, generate};
pub use command::{Invocation, build_invocation};
pub use error::{ConfigError, SweepError};
pub use executor::{ExecutorOptions, SweepSummary, run_sweep};
pub use launcher::{ExitOutcome, Launcher, OutputMode, ProcessLauncher};
pub use matrix::{Dimension, Matrix, MatrixParts, build_matrix};
pub use model::{Argument, ParameterDeclaration, Position, Scalar, VarEntry, flatten_entries};
pub use plan::SweepPlan;
pub use progress::{ColumnSnapshot, ProgressSnapshot, SweepProgress};
