//! Procedure vocabulary registry.
//!
//! This module centralizes the procedure paths, descriptions and CLI short flags so registries and
//! CLI hosts don't need stringly-typed comparisons.

/// Stable identifier for the exposed procedures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcedureId {
    TestRun,
    TestCoverage,
}

/// How a CLI host renders a procedure's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Json,
}

impl OutputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputMode::Json => "json",
        }
    }
}

/// Metadata entry for a procedure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcedureInfo {
    pub id: ProcedureId,
    /// Ordered path segments (e.g. `["test", "run"]`).
    pub segments: &'static [&'static str],
    pub description: &'static str,
    /// Long option name to single-character short flag.
    pub shorts: &'static [(&'static str, char)],
    pub output: OutputMode,
}

/// Path of the process-execution collaborator the test procedures delegate to.
pub const SHELL_EXEC: &[&str] = &["shell", "exec"];

/// Registry of exposed procedures.
pub const PROCEDURES: &[ProcedureInfo] = &[
    ProcedureInfo {
        id: ProcedureId::TestRun,
        segments: &["test", "run"],
        description: "Run tests for a package",
        shorts: &[("cwd", 'C'), ("watch", 'w'), ("coverage", 'c'), ("pattern", 'p')],
        output: OutputMode::Json,
    },
    ProcedureInfo {
        id: ProcedureId::TestCoverage,
        segments: &["test", "coverage"],
        description: "Run tests with coverage reporting",
        shorts: &[("cwd", 'C'), ("pattern", 'p'), ("threshold", 't')],
        output: OutputMode::Json,
    },
];

/// Return the metadata entry for a procedure id.
pub fn info(id: ProcedureId) -> &'static ProcedureInfo {
    // PROCEDURES has one entry per variant; the guardrail test keeps it that way.
    match id {
        ProcedureId::TestRun => &PROCEDURES[0],
        ProcedureId::TestCoverage => &PROCEDURES[1],
    }
}

/// Resolve path segments to a procedure id.
pub fn from_segments(segments: &[&str]) -> Option<ProcedureId> {
    PROCEDURES.iter().find(|p| p.segments == segments).map(|p| p.id)
}

/// Resolve a dotted name (`test.run`) to a procedure id.
pub fn from_dotted(name: &str) -> Option<ProcedureId> {
    let segments: Vec<&str> = name.split('.').collect();
    from_segments(&segments)
}

/// Return the dotted name of a procedure (`test.coverage`).
pub fn dotted(id: ProcedureId) -> String {
    info(id).segments.join(".")
}

/// Look up the short flag for a long option name.
pub fn short_for(id: ProcedureId, long: &str) -> Option<char> {
    info(id).shorts.iter().find(|(name, _)| *name == long).map(|(_, short)| *short)
}
