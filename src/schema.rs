//! Input/output schema adapters for procedures.
//!
//! A procedure never sees raw JSON: the registry runs its [`InputSchema`] first and only calls the
//! handler with a typed value. Any validation library can sit behind the trait; [`SerdeSchema`] adapts
//! serde, using `serde_path_to_error` to report which field was rejected.
//!
//! Outputs go through an [`OutputSchema`]. The test procedures use [`PassThrough`], which serializes
//! whatever the handler returned without checking its shape.

use std::fmt;
use std::marker::PhantomData;

use miette::Diagnostic;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::error::ProcedureError;

// ============================================================================
// Validation errors
// ============================================================================

/// One segment of the path to a rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Path from the input root to the field; empty when the input itself is rejected.
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl ValidationIssue {
    /// Dotted rendering of the path (`"watch"`, `"a.0.b"`), or `"<input>"` for the root.
    pub fn dotted_path(&self) -> String {
        if self.path.is_empty() {
            return "<input>".to_string();
        }
        self.path.iter().map(ToString::to_string).collect::<Vec<_>>().join(".")
    }
}

/// Input rejected before the handler ran.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic, Serialize)]
#[error("{message}{}", render_issues(.issues))]
#[diagnostic(
    code(testproc::invalid_input),
    help("run `testproc list` to see the fields each procedure accepts")
)]
pub struct ValidationError {
    pub message: String,
    pub issues: Vec<ValidationIssue>,
}

fn render_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("\n  - {}: {}", issue.dotted_path(), issue.message))
        .collect()
}

impl ValidationError {
    /// Create an error with a single issue.
    pub fn single(path: Vec<PathSegment>, message: impl Into<String>) -> Self {
        Self {
            message: "Validation failed".to_string(),
            issues: vec![ValidationIssue {
                path,
                message: message.into(),
            }],
        }
    }

    fn from_serde(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = err
            .path()
            .iter()
            .filter_map(|segment| match segment {
                serde_path_to_error::Segment::Seq { index } => Some(PathSegment::Index(*index)),
                serde_path_to_error::Segment::Map { key } => Some(PathSegment::Key(key.clone())),
                serde_path_to_error::Segment::Enum { variant } => Some(PathSegment::Key(variant.clone())),
                _ => None,
            })
            .collect();
        Self::single(path, err.into_inner().to_string())
    }
}

// ============================================================================
// Input schemas
// ============================================================================

/// Kind of an input field, as far as a CLI host needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    String,
    Number,
}

/// Description of one input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub help: &'static str,
}

/// Outcome of [`InputSchema::safe_parse`].
#[derive(Debug)]
pub enum SafeParse<T> {
    Success(T),
    Failure(ValidationError),
}

impl<T> SafeParse<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, SafeParse::Success(_))
    }

    pub fn into_result(self) -> Result<T, ValidationError> {
        match self {
            SafeParse::Success(value) => Ok(value),
            SafeParse::Failure(err) => Err(err),
        }
    }
}

/// Validate raw JSON into a typed procedure input.
pub trait InputSchema<T>: Send + Sync {
    /// Parse and validate, propagating the failure.
    fn parse(&self, data: &Value) -> Result<T, ValidationError>;

    /// Parse and validate, reporting the failure as a value.
    fn safe_parse(&self, data: &Value) -> SafeParse<T> {
        match self.parse(data) {
            Ok(value) => SafeParse::Success(value),
            Err(err) => SafeParse::Failure(err),
        }
    }

    /// Fields accepted by this schema.
    fn fields(&self) -> &[FieldSpec] {
        &[]
    }
}

/// [`InputSchema`] backed by a `serde::Deserialize` type.
///
/// Defaults and optional fields are whatever the type's serde attributes say. Unknown keys are ignored.
pub struct SerdeSchema<T> {
    fields: &'static [FieldSpec],
    _marker: PhantomData<fn() -> T>,
}

impl<T> SerdeSchema<T> {
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        Self {
            fields,
            _marker: PhantomData,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl<T: DeserializeOwned> InputSchema<T> for SerdeSchema<T> {
    fn parse(&self, data: &Value) -> Result<T, ValidationError> {
        if !data.is_object() {
            return Err(ValidationError::single(
                Vec::new(),
                format!("expected object, received {}", json_kind(data)),
            ));
        }
        serde_path_to_error::deserialize(data).map_err(ValidationError::from_serde)
    }

    fn fields(&self) -> &[FieldSpec] {
        self.fields
    }
}

// ============================================================================
// Output schemas
// ============================================================================

/// Convert a typed procedure output into the JSON returned to the caller.
pub trait OutputSchema<T>: Send + Sync {
    fn to_value(&self, output: T) -> Result<Value, ProcedureError>;
}

/// Output schema that accepts any serializable value as-is.
pub struct PassThrough;

impl<T: Serialize> OutputSchema<T> for PassThrough {
    fn to_value(&self, output: T) -> Result<Value, ProcedureError> {
        Ok(serde_json::to_value(output)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        name: Option<String>,
        #[serde(default)]
        flag: bool,
        #[serde(default)]
        items: Vec<u32>,
    }

    const SAMPLE: SerdeSchema<Sample> = SerdeSchema::new(&[FieldSpec {
        name: "name",
        kind: FieldKind::String,
        help: "A name",
    }]);

    #[test]
    fn test_parse_applies_defaults() {
        let parsed = SAMPLE.parse(&json!({})).unwrap();
        assert_eq!(
            parsed,
            Sample {
                name: None,
                flag: false,
                items: vec![]
            }
        );
    }

    #[test]
    fn test_parse_ignores_unknown_keys() {
        let parsed = SAMPLE.parse(&json!({"name": "x", "extra": 1})).unwrap();
        assert_eq!(parsed.name.as_deref(), Some("x"));
    }

    #[test]
    fn test_parse_reports_field_path() {
        let err = SAMPLE.parse(&json!({"flag": "yes"})).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].path, vec![PathSegment::Key("flag".to_string())]);
        assert!(err.issues[0].message.contains("boolean"));
    }

    #[test]
    fn test_parse_reports_nested_index() {
        let err = SAMPLE.parse(&json!({"items": [1, "two"]})).unwrap_err();
        assert_eq!(
            err.issues[0].path,
            vec![PathSegment::Key("items".to_string()), PathSegment::Index(1)]
        );
        assert_eq!(err.issues[0].dotted_path(), "items.1");
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = SAMPLE.parse(&json!([1, 2])).unwrap_err();
        assert!(err.issues[0].path.is_empty());
        assert_eq!(err.issues[0].message, "expected object, received array");
        assert_eq!(err.issues[0].dotted_path(), "<input>");
    }

    #[test]
    fn test_safe_parse() {
        assert!(SAMPLE.safe_parse(&json!({"flag": true})).is_success());
        let failed = SAMPLE.safe_parse(&json!({"flag": 3}));
        assert!(!failed.is_success());
        assert!(failed.into_result().is_err());
    }

    #[test]
    fn test_display_lists_issues() {
        let err = ValidationError::single(vec![PathSegment::Key("threshold".to_string())], "expected f64");
        assert_eq!(err.to_string(), "Validation failed\n  - threshold: expected f64");
    }

    #[test]
    fn test_fields() {
        assert_eq!(SAMPLE.fields().len(), 1);
        assert_eq!(SAMPLE.fields()[0].kind, FieldKind::String);
    }

    #[test]
    fn test_pass_through_serializes() {
        let value = PassThrough.to_value(vec![1, 2]).unwrap();
        assert_eq!(value, json!([1, 2]));
    }
}
