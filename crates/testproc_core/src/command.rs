//! Test-runner argv construction.
//!
//! Builds the argument list for a `run` or `coverage` invocation. The caller joins it into the single
//! command string that `shell.exec` expects (see [`join_command`]).
//!
//! ## Notes
//!
//! - Empty `pattern`/`reporter` values add nothing, same as absent ones.
//! - Values are not quoted or escaped; they are appended verbatim.

/// Tokens that make up a runner invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerSyntax {
    /// Invocation token (e.g. `vitest`, or `npx vitest`).
    pub program: String,
    /// Subcommand for a single non-interactive run.
    pub run_subcommand: String,
    pub coverage_flag: String,
    /// Flag whose value is passed as the *next* argument.
    pub reporter_flag: String,
}

impl Default for RunnerSyntax {
    fn default() -> Self {
        Self {
            program: "vitest".to_string(),
            run_subcommand: "run".to_string(),
            coverage_flag: "--coverage".to_string(),
            reporter_flag: "--reporter".to_string(),
        }
    }
}

/// Options that shape a `test.run` command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunArgs<'a> {
    pub pattern: Option<&'a str>,
    pub watch: bool,
    pub coverage: bool,
    pub reporter: Option<&'a str>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Build the argv for a `test.run` invocation.
///
/// ## Examples
/// ```rust
/// use testproc_core::{RunArgs, RunnerSyntax, build_run_args};
///
/// let args = build_run_args(&RunnerSyntax::default(), &RunArgs { watch: true, ..RunArgs::default() });
/// assert_eq!(args, vec!["vitest"]);
/// ```
pub fn build_run_args(syntax: &RunnerSyntax, args: &RunArgs<'_>) -> Vec<String> {
    let mut argv = vec![syntax.program.clone()];

    // Watch mode is the runner's default behavior when no subcommand is given
    if !args.watch {
        argv.push(syntax.run_subcommand.clone());
    }

    if let Some(pattern) = non_empty(args.pattern) {
        argv.push(pattern.to_string());
    }

    if args.coverage {
        argv.push(syntax.coverage_flag.clone());
    }

    if let Some(reporter) = non_empty(args.reporter) {
        argv.push(syntax.reporter_flag.clone());
        argv.push(reporter.to_string());
    }

    argv
}

/// Build the argv for a `test.coverage` invocation.
///
/// Always a single run with coverage enabled; there is no watch mode.
pub fn build_coverage_args(syntax: &RunnerSyntax, pattern: Option<&str>) -> Vec<String> {
    let mut argv = vec![
        syntax.program.clone(),
        syntax.run_subcommand.clone(),
        syntax.coverage_flag.clone(),
    ];

    if let Some(pattern) = non_empty(pattern) {
        argv.push(pattern.to_string());
    }

    argv
}

/// Join an argv into the space-separated command string sent to `shell.exec`.
pub fn join_command(argv: &[String]) -> String {
    argv.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vitest() -> RunnerSyntax {
        RunnerSyntax::default()
    }

    #[test]
    fn test_run_defaults() {
        let argv = build_run_args(&vitest(), &RunArgs::default());
        assert_eq!(argv, vec!["vitest", "run"]);
    }

    #[test]
    fn test_run_watch_omits_run() {
        let argv = build_run_args(
            &vitest(),
            &RunArgs {
                watch: true,
                pattern: Some("src/a.test.ts"),
                ..RunArgs::default()
            },
        );
        assert_eq!(argv, vec!["vitest", "src/a.test.ts"]);
    }

    #[test]
    fn test_run_all_options_in_order() {
        let argv = build_run_args(
            &vitest(),
            &RunArgs {
                pattern: Some("math"),
                watch: false,
                coverage: true,
                reporter: Some("verbose"),
            },
        );
        assert_eq!(argv, vec!["vitest", "run", "math", "--coverage", "--reporter", "verbose"]);
    }

    #[test]
    fn test_run_empty_strings_ignored() {
        let argv = build_run_args(
            &vitest(),
            &RunArgs {
                pattern: Some(""),
                reporter: Some(""),
                ..RunArgs::default()
            },
        );
        assert_eq!(argv, vec!["vitest", "run"]);
    }

    #[test]
    fn test_coverage_args() {
        assert_eq!(build_coverage_args(&vitest(), None), vec!["vitest", "run", "--coverage"]);
        assert_eq!(
            build_coverage_args(&vitest(), Some("utils")),
            vec!["vitest", "run", "--coverage", "utils"]
        );
        assert_eq!(build_coverage_args(&vitest(), Some("")), vec!["vitest", "run", "--coverage"]);
    }

    #[test]
    fn test_custom_program() {
        let syntax = RunnerSyntax {
            program: "npx vitest".to_string(),
            ..RunnerSyntax::default()
        };
        let argv = build_coverage_args(&syntax, None);
        assert_eq!(join_command(&argv), "npx vitest run --coverage");
    }

    #[test]
    fn test_join_command() {
        let argv = vec!["vitest".to_string(), "run".to_string()];
        assert_eq!(join_command(&argv), "vitest run");
        assert_eq!(join_command(&[]), "");
    }
}
