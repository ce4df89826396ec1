//! Provide the shared, pure vocabulary for the `testproc` procedures.
//!
//! This crate is intentionally small and dependency-free. It contains deterministic helpers that both:
//! - the procedure handlers use to build the command line handed to `shell.exec`, and
//! - CLI hosts and registries use to name procedures and their short flags consistently.
//!
//! ## Notes
//!
//! - This is a “semantic core” crate: **no IO**, no global state, no async.
//! - Current scope: procedure identifiers and metadata (`procedures`) and test-runner argv construction
//!   (`command`).

pub mod command;
pub mod procedures;

pub use command::{RunArgs, RunnerSyntax, build_coverage_args, build_run_args, join_command};
pub use procedures::{OutputMode, ProcedureId, ProcedureInfo};
