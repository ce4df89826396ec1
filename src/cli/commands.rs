//! CLI command implementations
//!
//! All command functions return `CliResult<T>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::config::RunnerConfig;
use crate::error::ProcedureError;
use crate::register::register_test_procedures;
use crate::registry::ProcedureRegistry;
use crate::schema::FieldKind;

use super::replay::{RecordedCall, ReplayContext};
use super::tree::{flags_to_input, procedure_command, resolve_path};
use super::{CliError, CliResult, ExitCode};

/// Exit code used when a procedure rejects its input.
pub const INVALID_INPUT: i32 = 2;

/// Create the registry the CLI host serves.
pub fn build_registry(config: &RunnerConfig) -> CliResult<ProcedureRegistry> {
    let mut registry = ProcedureRegistry::new();
    register_test_procedures(&mut registry, config)
        .map_err(|e| CliError::failure(format!("Error: {}", e)))?;
    Ok(registry)
}

fn kind_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Bool => "boolean",
        FieldKind::String => "string",
        FieldKind::Number => "number",
    }
}

/// Describe every registered procedure as JSON.
pub fn list_procedures(registry: &ProcedureRegistry) -> Value {
    let procedures: Vec<Value> = registry
        .iter()
        .map(|procedure| {
            let meta = procedure.meta();
            let shorts: Map<String, Value> = meta
                .shorts
                .iter()
                .map(|(long, short)| (long.clone(), Value::String(short.to_string())))
                .collect();
            let fields: Vec<Value> = procedure
                .fields()
                .iter()
                .map(|f| json!({"name": f.name, "type": kind_name(f.kind), "description": f.help}))
                .collect();
            json!({
                "path": procedure.path().to_string(),
                "description": meta.description,
                "args": meta.args,
                "shorts": shorts,
                "output": meta.output.as_str(),
                "fields": fields,
            })
        })
        .collect();
    Value::Array(procedures)
}

/// What `testproc call` prints: the executor requests it saw and the procedure output.
#[derive(Debug, Serialize)]
pub struct CallReport {
    pub requests: Vec<RecordedCall>,
    pub output: Value,
}

impl CallReport {
    /// `0` when the procedure reported success, `1` otherwise.
    pub fn exit_code(&self) -> ExitCode {
        if self.output.get("success").and_then(Value::as_bool) == Some(true) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

fn base_input(raw: Option<&str>) -> CliResult<Value> {
    match raw {
        None => Ok(Value::Object(Map::new())),
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| CliError::failure(format!("Error: --input is not valid JSON: {}", e))),
    }
}

fn procedure_error(err: ProcedureError) -> CliError {
    match err {
        ProcedureError::Invalid(invalid) => {
            CliError::with_code(format!("{:?}", miette::Report::new(invalid)), INVALID_INPUT)
        }
        other => CliError::failure(format!("Error: {}", other)),
    }
}

/// Invoke the procedure named by `args` (path segments followed by its flags) against `ctx`.
///
/// `raw_input` is a JSON object the flags are merged into; flags win on conflicts.
pub async fn call_procedure(
    registry: &ProcedureRegistry,
    ctx: &ReplayContext,
    args: &[String],
    raw_input: Option<&str>,
) -> CliResult<CallReport> {
    let matches = match procedure_command(registry).try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(err) if !err.use_stderr() => {
            // --help / --version: clap output goes to stdout, nothing else to report
            let _ = err.print();
            return Err(CliError::new("", ExitCode::SUCCESS));
        }
        Err(err) => return Err(CliError::with_code(err.render().to_string(), err.exit_code())),
    };

    let (segments, leaf) = resolve_path(&matches);
    let procedure = registry
        .get(&segments[..])
        .ok_or_else(|| CliError::failure(format!("Error: unknown procedure '{}'", segments.join("."))))?;

    let mut input = base_input(raw_input)?;
    let flags = flags_to_input(procedure.fields(), leaf);
    if !flags.is_empty() {
        let Some(object) = input.as_object_mut() else {
            return Err(CliError::failure(
                "Error: --input must be a JSON object when combined with procedure flags",
            ));
        };
        object.extend(flags);
    }

    let path: Vec<&str> = segments.iter().map(String::as_str).collect();
    let output = registry
        .invoke(&path, input, ctx)
        .await
        .map_err(procedure_error)?;

    Ok(CallReport {
        requests: ctx.calls(),
        output,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn replay(exit_code: i32, stdout: &str) -> ReplayContext {
        ReplayContext::new(
            RunnerConfig::default().executor_path,
            exit_code,
            stdout.to_string(),
            String::new(),
        )
    }

    #[test]
    fn test_list_procedures() {
        let registry = build_registry(&RunnerConfig::default()).unwrap();
        let listed = list_procedures(&registry);
        let paths: Vec<&str> = listed
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["path"].as_str().unwrap())
            .collect();
        assert_eq!(paths, vec!["test.coverage", "test.run"]);
        assert_eq!(listed[1]["shorts"]["watch"], "w");
        assert_eq!(listed[0]["shorts"]["threshold"], "t");
        assert_eq!(listed[0]["output"], "json");
    }

    #[tokio::test]
    async fn test_call_coverage_gate() {
        let registry = build_registry(&RunnerConfig::default()).unwrap();
        let ctx = replay(0, "All files |   72.4 |\n");
        let report = call_procedure(&registry, &ctx, &args(&["test", "coverage", "-t", "80"]), None)
            .await
            .unwrap();

        assert_eq!(report.output["coverage"], 72.4);
        assert_eq!(report.output["success"], false);
        assert_eq!(report.exit_code(), ExitCode::FAILURE);
        assert_eq!(report.requests.len(), 1);
        assert_eq!(report.requests[0].payload, json!({"command": "vitest run --coverage"}));
    }

    #[tokio::test]
    async fn test_call_run_merges_input() {
        let registry = build_registry(&RunnerConfig::default()).unwrap();
        let ctx = replay(0, "");
        let report = call_procedure(
            &registry,
            &ctx,
            &args(&["test", "run", "-w"]),
            Some(r#"{"cwd": "/pkg", "timeout": 1000}"#),
        )
        .await
        .unwrap();

        assert_eq!(report.exit_code(), ExitCode::SUCCESS);
        assert_eq!(
            report.requests[0].payload,
            json!({"command": "vitest", "cwd": "/pkg", "timeout": 1000})
        );
    }

    #[tokio::test]
    async fn test_call_invalid_input() {
        let registry = build_registry(&RunnerConfig::default()).unwrap();
        let ctx = replay(0, "");
        let err = call_procedure(&registry, &ctx, &args(&["test", "run"]), Some(r#"{"watch": "yes"}"#))
            .await
            .unwrap_err();

        assert_eq!(err.exit_code, ExitCode(INVALID_INPUT));
        assert!(err.message.contains("watch"));
        assert!(ctx.calls().is_empty());
    }

    #[tokio::test]
    async fn test_call_bad_json() {
        let registry = build_registry(&RunnerConfig::default()).unwrap();
        let ctx = replay(0, "");
        let err = call_procedure(&registry, &ctx, &args(&["test", "run"]), Some("{not json"))
            .await
            .unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
    }

    #[tokio::test]
    async fn test_call_unknown_flag() {
        let registry = build_registry(&RunnerConfig::default()).unwrap();
        let ctx = replay(0, "");
        let err = call_procedure(&registry, &ctx, &args(&["test", "run", "--bogus"]), None)
            .await
            .unwrap_err();
        assert_ne!(err.exit_code, ExitCode::SUCCESS);
    }
}
