//! Registration of the test procedures.
//!
//! Call [`register_test_procedures`] once while the host starts up:
//!
//! ```rust
//! use testproc::{ProcedureRegistry, RunnerConfig, register_test_procedures};
//!
//! let mut registry = ProcedureRegistry::new();
//! register_test_procedures(&mut registry, &RunnerConfig::default()).unwrap();
//! assert!(registry.get(&["test", "coverage"]).is_some());
//! ```

use testproc_core::ProcedureId;
use testproc_core::procedures;

use crate::config::RunnerConfig;
use crate::error::RegistryError;
use crate::procedures::test::{
    COVERAGE_INPUT_SCHEMA, CoverageInput, CoverageOutput, RUN_INPUT_SCHEMA, RunInput, RunOutput, TestCoverage,
    TestRun,
};
use crate::registry::{ProcedureDef, ProcedureMeta, ProcedurePath, ProcedureRegistry};
use crate::schema::PassThrough;

fn test_run_procedure(config: &RunnerConfig) -> ProcedureDef<RunInput, RunOutput> {
    let info = procedures::info(ProcedureId::TestRun);
    ProcedureDef {
        path: ProcedurePath::from_segments(info.segments),
        input: Box::new(RUN_INPUT_SCHEMA),
        output: Box::new(PassThrough),
        meta: ProcedureMeta::from_info(info),
        handler: Box::new(TestRun { config: config.clone() }),
    }
}

fn test_coverage_procedure(config: &RunnerConfig) -> ProcedureDef<CoverageInput, CoverageOutput> {
    let info = procedures::info(ProcedureId::TestCoverage);
    ProcedureDef {
        path: ProcedurePath::from_segments(info.segments),
        input: Box::new(COVERAGE_INPUT_SCHEMA),
        output: Box::new(PassThrough),
        meta: ProcedureMeta::from_info(info),
        handler: Box::new(TestCoverage { config: config.clone() }),
    }
}

/// Register `test.run` and `test.coverage` into `registry`.
pub fn register_test_procedures(registry: &mut ProcedureRegistry, config: &RunnerConfig) -> Result<(), RegistryError> {
    registry.register_procedures(vec![
        test_run_procedure(config).boxed(),
        test_coverage_procedure(config).boxed(),
    ])
}
