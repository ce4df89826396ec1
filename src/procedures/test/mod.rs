//! Test execution procedures
//!
//! - `test.run` - Run tests (vitest)
//! - `test.coverage` - Run tests with coverage


pub use coverage::{TestCoverage, coverage_request, test_coverage};
pub use run::{TestRun, run_request, test_run};
pub use types::{COVERAGE_INPUT_SCHEMA, CoverageInput, CoverageOutput, RUN_INPUT_SCHEMA, RunInput, RunOutput};
