//! In-process procedure registry.
//!
//! Procedures are described by a plain [`ProcedureDef`] record (path, schemas, metadata, handler) and
//! handed to [`ProcedureRegistry::register_procedures`]. There is no global registry: the hosting process
//! owns a `ProcedureRegistry` value, populates it once at startup and shares it by reference afterwards.
//!
//! ## Invocation
//!
//! [`ProcedureRegistry::invoke`] validates the raw JSON input with the procedure's input schema before
//! the handler runs, so handlers only ever see typed, well-formed input.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde_json::Value;
use testproc_core::{OutputMode, ProcedureInfo};

use crate::context::ProcedureContext;
use crate::error::{ProcedureError, RegistryError};
use crate::schema::{FieldSpec, InputSchema, OutputSchema};

// ============================================================================
// Paths and metadata
// ============================================================================

/// Ordered path segments identifying a procedure (`test.run` is `["test", "run"]`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcedurePath(Vec<String>);

impl ProcedurePath {
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> Self {
        Self(segments.iter().map(|s| s.as_ref().to_string()).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for ProcedurePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for ProcedurePath {
    type Err = ProcedureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.split('.').any(str::is_empty) {
            return Err(ProcedureError::UnknownProcedure(s.to_string()));
        }
        Ok(Self(s.split('.').map(str::to_string).collect()))
    }
}

/// Metadata a CLI host uses to expose a procedure.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureMeta {
    pub description: String,
    /// Fields accepted positionally (in order)
    pub args: Vec<String>,
    /// Long option name to short flag
    pub shorts: Vec<(String, char)>,
    pub output: OutputMode,
}

impl ProcedureMeta {
    pub fn from_info(info: &ProcedureInfo) -> Self {
        Self {
            description: info.description.to_string(),
            args: Vec::new(),
            shorts: info.shorts.iter().map(|(long, short)| (long.to_string(), *short)).collect(),
            output: info.output,
        }
    }

    pub fn short_for(&self, long: &str) -> Option<char> {
        self.shorts.iter().find(|(name, _)| name == long).map(|(_, short)| *short)
    }
}

// ============================================================================
// Handlers and definitions
// ============================================================================

/// Typed procedure handler.
#[async_trait]
pub trait Handler<I, O>: Send + Sync
where
    I: Send + 'static,
    O: Send + 'static,
{
    async fn handle(&self, input: I, ctx: &dyn ProcedureContext) -> Result<O, ProcedureError>;
}

/// Everything needed to register one procedure.
pub struct ProcedureDef<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    pub path: ProcedurePath,
    pub input: Box<dyn InputSchema<I>>,
    pub output: Box<dyn OutputSchema<O>>,
    pub meta: ProcedureMeta,
    pub handler: Box<dyn Handler<I, O>>,
}

/// Type-erased view of a [`ProcedureDef`], as stored in the registry.
#[async_trait]
pub trait RegisteredProcedure: Send + Sync {
    fn path(&self) -> &ProcedurePath;

    fn meta(&self) -> &ProcedureMeta;

    fn fields(&self) -> &[FieldSpec];

    /// Validate `input`, run the handler and serialize its output.
    async fn invoke(&self, input: Value, ctx: &dyn ProcedureContext) -> Result<Value, ProcedureError>;
}

#[async_trait]
impl<I, O> RegisteredProcedure for ProcedureDef<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    fn path(&self) -> &ProcedurePath {
        &self.path
    }

    fn meta(&self) -> &ProcedureMeta {
        &self.meta
    }

    fn fields(&self) -> &[FieldSpec] {
        self.input.fields()
    }

    async fn invoke(&self, input: Value, ctx: &dyn ProcedureContext) -> Result<Value, ProcedureError> {
        let parsed = match self.input.parse(&input) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::debug!(procedure = %self.path, issues = err.issues.len(), "input rejected");
                return Err(err.into());
            }
        };
        let output = self.handler.handle(parsed, ctx).await?;
        self.output.to_value(output)
    }
}

impl<I, O> ProcedureDef<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    /// Erase the input/output types for storage in a registry.
    pub fn boxed(self) -> Box<dyn RegisteredProcedure> {
        Box::new(self)
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Procedures keyed by path.
#[derive(Default)]
pub struct ProcedureRegistry {
    procedures: BTreeMap<ProcedurePath, Box<dyn RegisteredProcedure>>,
}

impl ProcedureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a batch of procedures.
    ///
    /// Fails on the first path that is already taken; procedures before it stay registered.
    pub fn register_procedures(&mut self, procedures: Vec<Box<dyn RegisteredProcedure>>) -> Result<(), RegistryError> {
        for procedure in procedures {
            let path = procedure.path().clone();
            if self.procedures.contains_key(&path) {
                return Err(RegistryError::Duplicate(path.to_string()));
            }
            tracing::debug!(procedure = %path, "registered procedure");
            self.procedures.insert(path, procedure);
        }
        Ok(())
    }

    pub fn get<S: AsRef<str>>(&self, path: &[S]) -> Option<&dyn RegisteredProcedure> {
        self.procedures
            .get(&ProcedurePath::from_segments(path))
            .map(|p| p.as_ref())
    }

    /// Registered procedures, sorted by path.
    pub fn iter(&self) -> impl Iterator<Item = &dyn RegisteredProcedure> {
        self.procedures.values().map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }

    /// Validate `input` against the procedure at `path` and run it.
    #[tracing::instrument(skip_all, fields(procedure = %path.join(".")))]
    pub async fn invoke(
        &self,
        path: &[&str],
        input: Value,
        ctx: &dyn ProcedureContext,
    ) -> Result<Value, ProcedureError> {
        let procedure = self
            .get(path)
            .ok_or_else(|| ProcedureError::UnknownProcedure(path.join(".")))?;
        procedure.invoke(input, ctx).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::CallError;
    use crate::schema::{PassThrough, SerdeSchema};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct EchoInput {
        text: String,
    }

    struct Echo;

    #[async_trait]
    impl Handler<EchoInput, String> for Echo {
        async fn handle(&self, input: EchoInput, _ctx: &dyn ProcedureContext) -> Result<String, ProcedureError> {
            Ok(input.text)
        }
    }

    struct NoCalls;

    #[async_trait]
    impl ProcedureContext for NoCalls {
        async fn call(&self, path: &[&str], _payload: Value) -> Result<Value, CallError> {
            Err(CallError::new(format!("unexpected call to {}", path.join("."))))
        }
    }

    fn echo_def(path: &[&str]) -> Box<dyn RegisteredProcedure> {
        ProcedureDef {
            path: ProcedurePath::from_segments(path),
            input: Box::new(SerdeSchema::<EchoInput>::new(&[])),
            output: Box::new(PassThrough),
            meta: ProcedureMeta {
                description: "Echo".to_string(),
                args: vec![],
                shorts: vec![("text".to_string(), 'x')],
                output: OutputMode::Json,
            },
            handler: Box::new(Echo),
        }
        .boxed()
    }

    #[test]
    fn test_path_display_and_parse() {
        let path: ProcedurePath = "test.run".parse().unwrap();
        assert_eq!(path, ProcedurePath::from_segments(&["test", "run"]));
        assert_eq!(path.to_string(), "test.run");
        assert!("test..run".parse::<ProcedurePath>().is_err());
        assert!("".parse::<ProcedurePath>().is_err());
    }

    #[test]
    fn test_meta_short_for() {
        let meta = ProcedureMeta::from_info(testproc_core::procedures::info(testproc_core::ProcedureId::TestRun));
        assert_eq!(meta.short_for("watch"), Some('w'));
        assert_eq!(meta.short_for("timeout"), None);
        assert!(meta.args.is_empty());
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = ProcedureRegistry::new();
        registry.register_procedures(vec![echo_def(&["util", "echo"])]).unwrap();
        let err = registry.register_procedures(vec![echo_def(&["util", "echo"])]).unwrap_err();
        assert_eq!(err, RegistryError::Duplicate("util.echo".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_iter_sorted_by_path() {
        let mut registry = ProcedureRegistry::new();
        registry
            .register_procedures(vec![echo_def(&["b", "two"]), echo_def(&["a", "one"])])
            .unwrap();
        let paths: Vec<String> = registry.iter().map(|p| p.path().to_string()).collect();
        assert_eq!(paths, vec!["a.one", "b.two"]);
    }

    #[tokio::test]
    async fn test_invoke_validates_then_runs() {
        let mut registry = ProcedureRegistry::new();
        registry.register_procedures(vec![echo_def(&["util", "echo"])]).unwrap();

        let value = registry
            .invoke(&["util", "echo"], json!({"text": "hi"}), &NoCalls)
            .await
            .unwrap();
        assert_eq!(value, json!("hi"));

        let err = registry
            .invoke(&["util", "echo"], json!({"text": 1}), &NoCalls)
            .await
            .unwrap_err();
        assert!(matches!(err, ProcedureError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_invoke_unknown_path() {
        let registry = ProcedureRegistry::new();
        let err = registry.invoke(&["nope"], json!({}), &NoCalls).await.unwrap_err();
        assert!(matches!(err, ProcedureError::UnknownProcedure(ref p) if p == "nope"));
    }
}
