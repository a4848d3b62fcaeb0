//! Integration tests for the sweep engine
//!
//! Tests are organized by topic:
//! - `enumeration` - Combination counts, uniqueness and column order
//! - `end_to_end` - Declarations through to argv
//! - `executor` - Step loop, failures and cancellation
//! - `process` - Real child processes (unix only)

#[cfg(unix)]
mod process;
