//! Replay execution context for the CLI host.
//!
//! The CLI never spawns the test runner. `shell.exec` calls are answered with a result assembled from
//! captured output (for instance a CI log of an earlier vitest run), and every request is recorded so
//! the exact command a live host would execute can be printed.

use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::context::{ExecResult, ProcedureContext};
use crate::error::CallError;

/// A call observed by the replay context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedCall {
    pub path: String,
    pub payload: Value,
}

/// [`ProcedureContext`] answering the executor path with a fixed result.
pub struct ReplayContext {
    executor_path: Vec<String>,
    result: ExecResult,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ReplayContext {
    pub fn new(executor_path: Vec<String>, exit_code: i32, stdout: String, stderr: String) -> Self {
        Self {
            executor_path,
            result: ExecResult {
                exit_code,
                stdout,
                stderr,
                success: exit_code == 0,
            },
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calls recorded so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl ProcedureContext for ReplayContext {
    async fn call(&self, path: &[&str], payload: Value) -> Result<Value, CallError> {
        let dotted = path.join(".");
        if path != self.executor_path.as_slice() {
            return Err(CallError::new(format!("no procedure {dotted} on the replay host")));
        }

        tracing::info!(procedure = %dotted, payload = %payload, "replaying call");
        {
            let mut calls = self
                .calls
                .lock()
                .map_err(|_| CallError::new("replay call log poisoned"))?;
            calls.push(RecordedCall { path: dotted, payload });
        }

        serde_json::to_value(&self.result).map_err(|e| CallError::new(e.to_string()))
    }
}
