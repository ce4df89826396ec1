#![forbid(unsafe_code)]
//! Test execution procedures
//!
//! This crate provides two remote-callable procedures for running a package's tests:
//!
//! - `test.run` - run tests (vitest), optionally in watch mode, with coverage or a custom reporter
//! - `test.coverage` - run tests with coverage and gate on an optional percentage threshold
//!
//! Neither procedure spawns processes itself. Both build a command line, hand it to the host's
//! `shell.exec` procedure through a [`ProcedureContext`], and map the captured result to a JSON-serializable
//! output.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module
//!   enforces `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents a programming error, use `.expect("INVARIANT: reason")` with a
//!   clear explanation.

pub mod cli;
pub mod config;
pub mod context;
pub mod coverage;
pub mod error;
pub mod procedures;
pub mod register;
pub mod registry;
pub mod schema;
pub mod version;

pub use config::RunnerConfig;
pub use context::{ExecRequest, ExecResult, ProcedureContext};
pub use error::{CallError, ProcedureError, RegistryError};
pub use register::register_test_procedures;
pub use registry::{Handler, ProcedureDef, ProcedureMeta, ProcedurePath, ProcedureRegistry, RegisteredProcedure};
pub use schema::{InputSchema, OutputSchema, PassThrough, SafeParse, SerdeSchema, ValidationError};
