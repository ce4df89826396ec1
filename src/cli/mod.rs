//! CLI host for the test procedures
//!
//! ## Commands
//!
//! - `list` - Print the registered procedures (path, shorts, fields) as JSON
//! - `call <segments>... [flags]` - Invoke a procedure, e.g. `call test coverage -C pkg -t 80`
//!
//! ## Modules
//!
//! - `commands` - Command implementations
//! - `replay` - `shell.exec` stand-in that answers from captured output
//! - `tree` - Clap command tree generated from the registry
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing: derive macros for the fixed top level, the builder API
//! for the per-procedure flags (which come from the registry metadata).
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;
pub mod replay;
pub mod tree;

use std::fmt;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};

use crate::config::RunnerConfig;
use crate::version::TESTPROC_VERSION;

use replay::ReplayContext;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Create an error with a custom exit code.
    pub fn with_code(message: impl Into<String>, code: i32) -> Self {
        Self::new(message, ExitCode(code))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Test execution procedures (test.run, test.coverage)
#[derive(Parser, Debug)]
#[command(name = "testproc")]
#[command(version = TESTPROC_VERSION)]
#[command(about = "Test execution procedures (test.run, test.coverage)", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List registered procedures as JSON
    List,

    /// Invoke a procedure against captured runner output (nothing is executed)
    Call(CallArgs),
}

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Runner invocation token (default: vitest)
    #[arg(long, value_name = "PROGRAM")]
    pub runner: Option<String>,
    /// Exit code the replayed runner reports
    #[arg(long, value_name = "CODE", default_value_t = 0, allow_negative_numbers = true)]
    pub exit_code: i32,
    /// File holding the captured runner stdout
    #[arg(long, value_name = "FILE")]
    pub stdout_file: Option<PathBuf>,
    /// File holding the captured runner stderr
    #[arg(long, value_name = "FILE")]
    pub stderr_file: Option<PathBuf>,
    /// Procedure input as a JSON object; procedure flags are merged over it
    #[arg(long, value_name = "JSON")]
    pub input: Option<String>,
    /// Procedure path followed by its flags (e.g. `test coverage -t 80`)
    #[arg(
        value_name = "PROCEDURE",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub procedure: Vec<String>,
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub async fn run() {
    let cli = Cli::parse();

    match execute(cli).await {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
async fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::List => {
            let registry = commands::build_registry(&RunnerConfig::default())?;
            print_json(&commands::list_procedures(&registry))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Call(args) => execute_call(args).await,
    }
}

/// Handle the `call` subcommand.
async fn execute_call(args: CallArgs) -> CliResult<ExitCode> {
    let mut config = RunnerConfig::default();
    if let Some(runner) = args.runner {
        config = config.with_program(runner);
    }
    let registry = commands::build_registry(&config)?;

    let stdout = read_captured(args.stdout_file.as_deref()).await?;
    let stderr = read_captured(args.stderr_file.as_deref()).await?;
    let ctx = ReplayContext::new(config.executor_path.clone(), args.exit_code, stdout, stderr);

    let report = commands::call_procedure(&registry, &ctx, &args.procedure, args.input.as_deref()).await?;
    print_json(&report)?;
    Ok(report.exit_code())
}

/// Read a captured output file; no file means empty output.
async fn read_captured(path: Option<&Path>) -> CliResult<String> {
    let Some(path) = path else {
        return Ok(String::new());
    };
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CliError::failure(format!("Error reading {}: {}", path.display(), e)))
}

fn print_json<T: serde::Serialize>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::failure(format!("Error serializing output: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
