//! Crate version reported by `testproc --version`.
//!
//! Read from `CARGO_PKG_VERSION` when the crate is compiled, so the CLI and library callers see the
//! version of the build they link against.

/// The testproc version string (for example, `0.1.0`).
pub const TESTPROC_VERSION: &str = env!("CARGO_PKG_VERSION");
