//! `tourney-maintenance` library crate.
//!
//! Re-exports internal modules for integration testing. The binary
//! entrypoint lives in `main.rs`.

pub mod config;
pub mod error;
pub mod report;
pub mod runner;
pub mod tasks;

use tourney_core::maintenance::TaskResult;

use crate::error::TaskError;

/// Process exit status for a successful run, including idempotent no-ops.
pub const EXIT_SUCCESS: u8 = 0;

/// Process exit status for any unrecoverable failure.
pub const EXIT_FAILURE: u8 = 1;

/// Map a run's result to the process exit status.
pub fn exit_code(result: &Result<TaskResult, TaskError>) -> u8 {
    match result {
        Ok(r) if r.succeeded => EXIT_SUCCESS,
        _ => EXIT_FAILURE,
    }
}
