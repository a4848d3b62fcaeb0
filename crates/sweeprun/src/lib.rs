//! Parameter sweep runner
//!
//! Loads a YAML sweep file, expands its swept flags into every combination
//! and runs the configured executable once per combination, drawing a live
//! progress view while raw mode holds the terminal.

// ============================================================================
// Modules
// ============================================================================

pub mod app;
pub mod config;
pub mod lifecycle;
pub mod logging;
pub mod render;

// ============================================================================
// Re-exports
// ============================================================================

pub use app::{DEFAULT_STEP_DELAY, RunOptions, dry_run, run};
pub use config::{Scripts, Settings, SweepFile};
pub use lifecycle::{Lifecycle, LifecycleState, SweepExit};
pub use logging::{LogTarget, init_logging};
pub use render::{ProgressRenderer, ViewGate, draw_progress};
