//! Runner configuration for the test procedures
//!
//! Defaults target vitest executed through `shell.exec`.

use testproc_core::RunnerSyntax;
use testproc_core::procedures::SHELL_EXEC;

/// Runner configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Tokens used to build the runner command line
    pub syntax: RunnerSyntax,
    /// Path of the process-execution procedure
    pub executor_path: Vec<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            syntax: RunnerSyntax::default(),
            executor_path: SHELL_EXEC.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RunnerConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the runner invocation token (e.g. `npx vitest`)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.syntax.program = program.into();
        self
    }

    /// Set the path of the procedure that executes commands
    pub fn with_executor_path<S: AsRef<str>>(mut self, path: &[S]) -> Self {
        self.executor_path = path.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }
}
