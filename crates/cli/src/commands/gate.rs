use crate::{ExitCode, OutputOptions};
use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::Value;
use std::path::Path;

/// Fail when the JSON report at `report` holds a record with severity `error`
pub fn run(report: &Path, output: OutputOptions) -> Result<ExitCode> {
    let contents = std::fs::read_to_string(report)
        .with_context(|| format!("Failed to read {}", report.display()))?;
    let errors = gate(&contents)
        .with_context(|| format!("{} is not a valid JSON report", report.display()))?;

    if errors > 0 {
        eprintln!(
            "{}",
            format!("✗ Gate failed: {errors} error record(s) in {}", report.display()).red()
        );
        return Ok(ExitCode::LintError);
    }
    if output.show_info {
        println!("{}", "✓ Gate passed".green());
    }
    Ok(ExitCode::Success)
}

/// Number of error records in a JSON report
pub fn gate(contents: &str) -> serde_json::Result<usize> {
    let value: Value = serde_json::from_str(contents)?;
    Ok(count_errors(&value))
}

fn count_errors(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.iter().map(count_errors).sum(),
        Value::Object(fields) => {
            let own = usize::from(fields.get("severity").and_then(Value::as_str) == Some("error"));
            own + fields
                .iter()
                .filter(|(key, _)| key.as_str() != "severity")
                .map(|(_, v)| count_errors(v))
                .sum::<usize>()
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_record_fails() {
        let report = r#"[{"rule_id":"python-imports","severity":"error","line":1},{"rule_id":"x","severity":"warning"}]"#;
        assert_eq!(gate(report).unwrap(), 1);
    }

    #[test]
    fn test_clean_reports_pass() {
        assert_eq!(gate("[]").unwrap(), 0);
        assert_eq!(gate(r#"[{"severity":"warning"},{"severity":"info"}]"#).unwrap(), 0);
        // The text "error" elsewhere is not a severity
        assert_eq!(gate(r#"[{"message":"error","severity":"warning"}]"#).unwrap(), 0);
    }

    #[test]
    fn test_nested_records() {
        let report = r#"{"files":[{"file":"a.py","issues":[{"severity":"error"},{"severity":"error"}]}]}"#;
        assert_eq!(gate(report).unwrap(), 2);
    }

    #[test]
    fn test_invalid_json() {
        assert!(gate("[{").is_err());
    }

    #[test]
    fn test_run_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputOptions {
            show_progress: false,
            show_info: false,
        };

        let failing = dir.path().join("fail.json");
        std::fs::write(&failing, r#"[{"severity":"error"}]"#).unwrap();
        assert_eq!(run(&failing, output).unwrap(), ExitCode::LintError);

        let passing = dir.path().join("pass.json");
        std::fs::write(&passing, "[]").unwrap();
        assert_eq!(run(&passing, output).unwrap(), ExitCode::Success);

        let invalid = dir.path().join("bad.json");
        std::fs::write(&invalid, "not json").unwrap();
        let err = run(&invalid, output).unwrap_err();
        assert_eq!(ExitCode::from_error(&err), ExitCode::ParseError);

        let err = run(&dir.path().join("missing.json"), output).unwrap_err();
        assert_eq!(ExitCode::from_error(&err), ExitCode::IoError);
    }
}
