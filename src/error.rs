//! Error types shared by the registry, the contexts and the procedure handlers.
//!
//! A non-zero exit code from the test runner is *not* an error: it is reported as `success: false`
//! in the procedure output. The variants here cover rejected input, executor faults and registry misuse.

use thiserror::Error;

use crate::schema::ValidationError;

/// Fault raised by a [`ProcedureContext`](crate::context::ProcedureContext) when a call produces no result
/// (for example the executor binary is missing, or the callee is not registered on the host).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CallError {
    pub message: String,
}

impl CallError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors that occur while invoking a procedure.
#[derive(Debug, Error)]
pub enum ProcedureError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("unknown procedure: {0}")]
    UnknownProcedure(String),

    #[error("call to {path} failed: {source}")]
    Call {
        path: String,
        #[source]
        source: CallError,
    },

    #[error("malformed result from {path}: {source}")]
    MalformedResult {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize procedure output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors raised while populating a [`ProcedureRegistry`](crate::registry::ProcedureRegistry).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("procedure already registered: {0}")]
    Duplicate(String),
}
