//! Execution context handed to procedure handlers.
//!
//! Handlers never spawn processes. They reach collaborators (most importantly `shell.exec`) through
//! [`ProcedureContext::call`], which the hosting process implements on top of whatever transport and
//! executor it owns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CallError, ProcedureError};

/// Capability to call other procedures by path.
#[async_trait]
pub trait ProcedureContext: Send + Sync {
    /// Call the procedure at `path` with a JSON payload.
    ///
    /// Returns `Err` only when no result could be produced at all; a command that ran and failed is
    /// still an `Ok` result carrying its exit code.
    async fn call(&self, path: &[&str], payload: Value) -> Result<Value, CallError>;
}

/// Payload sent to `shell.exec`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecRequest {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    /// Milliseconds; enforced by the executor, not by the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// Result returned by `shell.exec`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecResult {
    pub exit_code: i32,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub success: bool,
}

/// Send `request` to the executor at `path` and read back its result.
pub async fn shell_exec(
    ctx: &dyn ProcedureContext,
    path: &[String],
    request: &ExecRequest,
) -> Result<ExecResult, ProcedureError> {
    let segments: Vec<&str> = path.iter().map(String::as_str).collect();
    let dotted = path.join(".");
    let payload = serde_json::to_value(request)?;

    let raw = ctx
        .call(&segments, payload)
        .await
        .map_err(|source| ProcedureError::Call {
            path: dotted.clone(),
            source,
        })?;

    serde_json::from_value(raw).map_err(|source| ProcedureError::MalformedResult { path: dotted, source })
}
