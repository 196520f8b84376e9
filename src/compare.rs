//! Fixture comparison
//!
//! Fixtures are opaque text. The only normalization is trimming leading and
//! trailing whitespace; the comparison itself is exact.

use std::fs;
use std::path::Path;

use crate::error::{HarnessError, HarnessResult};

const REPORT_INDENT: &str = "    ";

/// Read a fixture and strip surrounding whitespace.
pub fn load_fixture(path: &Path) -> HarnessResult<String> {
    let text = fs::read_to_string(path).map_err(|source| HarnessError::FixtureRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text.trim().to_string())
}

/// Compare `actual` against the fixture at `path`.
///
/// `command` is only used to label a mismatch.
pub fn check_fixture(path: &Path, actual: &str, command: &str) -> HarnessResult<()> {
    let expected = load_fixture(path)?;
    if expected == actual {
        return Ok(());
    }

    let report = mismatch_report(&expected, actual);
    tracing::error!("Command returned unexpected output: {}", command);
    for line in report.lines() {
        tracing::error!("{}", line);
    }
    Err(HarnessError::OutputMismatch {
        command: command.to_string(),
        fixture: path.to_path_buf(),
        report,
    })
}

/// Render expected and actual text, indented, followed by the differing lines.
pub fn mismatch_report(expected: &str, actual: &str) -> String {
    let mut report = String::new();
    report.push_str("Expected output:\n");
    report.push_str(&indent(expected));
    report.push_str("Actual output:\n");
    report.push_str(&indent(actual));
    report.push_str("Differences:\n");
    report.push_str(&line_diff(expected, actual));
    report
}

fn indent(text: &str) -> String {
    let mut out = String::new();
    for line in text.lines() {
        if !line.is_empty() {
            out.push_str(REPORT_INDENT);
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

/// Simple positional line diff.
fn line_diff(expected: &str, actual: &str) -> String {
    let mut diff = String::new();
    let expected_lines: Vec<&str> = expected.lines().collect();
    let actual_lines: Vec<&str> = actual.lines().collect();

    let max_lines = expected_lines.len().max(actual_lines.len());
    for i in 0..max_lines {
        let exp = expected_lines.get(i);
        let act = actual_lines.get(i);
        if exp == act {
            continue;
        }
        if let Some(line) = exp {
            diff.push_str(&format!("-{:4} | {}\n", i + 1, line));
        }
        if let Some(line) = act {
            diff.push_str(&format!("+{:4} | {}\n", i + 1, line));
        }
    }
    diff
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expected-results-1-original.txt");
        fs::write(&path, "\n\nThe result is 42\n\n").unwrap();
        assert_eq!(load_fixture(&path).unwrap(), "The result is 42");
    }

    #[test]
    fn test_exact_match_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "Adding!\nThe result is 7\n").unwrap();
        assert!(check_fixture(&path, "Adding!\nThe result is 7", "calc").is_ok());
    }

    #[test]
    fn test_inner_whitespace_is_significant() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "Adding!\nThe result is 7\n").unwrap();
        let err = check_fixture(&path, "Adding!\n The result is 7", "calc").unwrap_err();
        assert!(matches!(err, HarnessError::OutputMismatch { .. }));
    }

    #[test]
    fn test_missing_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_fixture(&dir.path().join("nope.txt"), "", "calc").unwrap_err();
        assert!(matches!(err, HarnessError::FixtureRead { .. }));
    }

    #[test]
    fn test_line_diff_marks_only_changed_lines() {
        let diff = line_diff("a\nb\nc", "a\nx\nc\nd");
        assert_eq!(diff, "-   2 | b\n+   2 | x\n+   4 | d\n");
    }

    #[test]
    fn test_report_indents_both_sides() {
        let report = mismatch_report("The result is 1", "The result is 2");
        insta::assert_snapshot!(report, @r"
        Expected output:
            The result is 1
        Actual output:
            The result is 2
        Differences:
        -   1 | The result is 1
        +   1 | The result is 2
        ");
    }
}
