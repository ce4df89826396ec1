//! Coverage percentage extraction from runner output.
//!
//! Reads the summary row of vitest's text coverage table:
//!
//! ```text
//! All files          |   87.5  |    80 |   90.9 |   87.5 |
//! ```
//!
//! Under any other reporter layout nothing matches and the coverage is reported as unknown.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static SUMMARY_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^All files[^|]*\|\s*([\d.]+)").expect("INVARIANT: coverage summary pattern is valid")
});

/// Extract the first percentage column of the `All files` row.
///
/// Returns `None` when no summary row is present. The value is the longest leading decimal of the
/// captured run (`92.31.` reads as `92.31`); a capture with no digits (`.`) yields `Some(0.0)`.
#[tracing::instrument(skip_all, fields(stdout_len = stdout.len()))]
pub fn extract_coverage(stdout: &str) -> Option<f64> {
    let captures = SUMMARY_ROW.captures(stdout)?;
    let raw = captures.get(1).map(|m| m.as_str()).unwrap_or_default();

    match leading_decimal(raw).parse::<f64>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(raw, "unparseable coverage percentage, using 0");
            Some(0.0)
        }
    }
}

/// Longest prefix of `raw` shaped like `digits[.digits]`.
fn leading_decimal(raw: &str) -> &str {
    let int_end = raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len());
    let Some(rest) = raw[int_end..].strip_prefix('.') else {
        return &raw[..int_end];
    };
    let frac_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    &raw[..int_end + 1 + frac_len]
}

/// Decide whether a coverage run passed.
///
/// The exit code gates first. The threshold is applied only when both it and the coverage are known.
pub fn coverage_gate(exit_code: i32, coverage: Option<f64>, threshold: Option<f64>) -> bool {
    let success = exit_code == 0;
    match (success, coverage, threshold) {
        (true, Some(coverage), Some(threshold)) => coverage >= threshold,
        _ => success,
    }
}
