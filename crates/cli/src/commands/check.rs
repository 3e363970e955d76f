use crate::commands::common::{lint_targets, targets, CommandContext};
use crate::progress::maybe_spinner;
use crate::report::{self, Summary};
use crate::{ExitCode, OutputFormat, OutputOptions};
use anyhow::Result;
use llamalint_linter::{
    CodeFix, Language, LintDiagnostic, LintResult, Linter, SourceSpan, TextEdit,
};
use std::path::{Path, PathBuf};

/// Rule id of the diagnostics reported for unformatted files
pub const FORMAT_RULE: &str = "format";

#[derive(Debug, Clone, clap::Args)]
pub struct CheckArgs {
    /// Files or directories to check (defaults to the current directory)
    pub paths: Vec<PathBuf>,

    /// Rule id to skip (repeatable)
    #[arg(short, long, value_name = "RULE")]
    pub ignore: Vec<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    pub output_format: OutputFormat,
}

pub fn run(
    config_path: Option<PathBuf>,
    args: &CheckArgs,
    output: OutputOptions,
) -> Result<ExitCode> {
    let ctx = CommandContext::load(config_path)?;
    let linter = ctx.linter(&args.ignore)?;
    let human = matches!(args.output_format, OutputFormat::Text);

    let spinner = maybe_spinner(human && output.show_progress, "Checking files...");
    let results = check_targets(&linter, &targets(&args.paths));
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let summary = Summary::new(&results);
    print!("{}", report::render(args.output_format, &results)?);
    if human && output.show_info {
        if !summary.is_clean() {
            println!();
        }
        println!("{}", report::render_summary(&summary));
    }

    Ok(if summary.errors > 0 {
        ExitCode::LintError
    } else {
        ExitCode::Success
    })
}

/// Lint without fixing, adding a `format` error to each file the formatters would change
pub fn check_targets(linter: &Linter, paths: &[PathBuf]) -> Vec<LintResult> {
    let mut results = lint_targets(linter, paths, false);
    for result in &mut results {
        if let Some(diagnostic) = format_diagnostic(linter, &result.path) {
            result.diagnostics.push(diagnostic);
            result.diagnostics.sort_by(|a, b| {
                (a.line(), a.column(), &a.rule).cmp(&(b.line(), b.column(), &b.rule))
            });
        }
    }
    results
}

fn format_diagnostic(linter: &Linter, path: &Path) -> Option<LintDiagnostic> {
    if Language::from_path(path).is_none() || linter.is_ignored(path) {
        return None;
    }
    // Unreadable files already carry a file-error
    let content = std::fs::read_to_string(path).ok()?;
    let formatted = linter.format_source(path, &content);
    if formatted == content {
        return None;
    }
    tracing::debug!(path = %path.display(), "File is not formatted");
    Some(
        LintDiagnostic::error(SourceSpan::file_start(), "File is not formatted", FORMAT_RULE)
            .with_fix(CodeFix::new(
                "Format file",
                vec![TextEdit::new(0, content.len(), formatted)],
            )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use llamalint_config::ProjectConfig;
    use std::fs;

    fn linter(root: &Path) -> Linter {
        Linter::new(&ProjectConfig::default_config())
            .unwrap()
            .with_root(root)
    }

    #[test]
    fn test_unformatted_file_gets_format_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.js"), "const a = 1;\n\n\n\n").unwrap();
        fs::write(dir.path().join("b.js"), "const b = 2;\n").unwrap();

        let results = check_targets(&linter(dir.path()), &[dir.path().to_path_buf()]);
        assert_eq!(results.len(), 2);

        let unformatted = &results[0];
        assert!(unformatted.path.ends_with("a.js"));
        let format: Vec<_> = unformatted
            .diagnostics
            .iter()
            .filter(|d| d.rule == FORMAT_RULE)
            .collect();
        assert_eq!(format.len(), 1);
        assert_eq!(format[0].message, "File is not formatted");
        assert_eq!(format[0].line(), 1);
        assert!(format[0].has_fix());
        assert!(unformatted.has_errors());

        assert!(results[1].diagnostics.iter().all(|d| d.rule != FORMAT_RULE));
    }

    #[test]
    fn test_check_does_not_modify_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.ts");
        fs::write(&path, "let a: number = 1;   \n").unwrap();

        let results = check_targets(&linter(dir.path()), &[path.clone()]);
        let rules: Vec<&str> = results[0].diagnostics.iter().map(|d| d.rule.as_str()).collect();
        assert_eq!(rules, vec![FORMAT_RULE, "no-trailing-whitespace"]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "let a: number = 1;   \n");
    }
}
